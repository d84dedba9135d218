use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::render_json;
    use crate::types::MajorSummary;

    #[test]
    fn renders_field_names_in_snake_case() {
        let rendered = render_json(&[MajorSummary {
            major: "SYEN".to_string(),
            required: vec!["SYS 612".to_string()],
            electives: vec![],
        }])
        .expect("json");
        assert!(rendered.contains("\"major\": \"SYEN\""));
        assert!(rendered.contains("\"electives\": []"));
    }
}
