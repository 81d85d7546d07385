use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use super::types::{SkinTone, StylingRequest};

pub const SHOPPING_KEYWORD_COUNT: usize = 5;

/// Trims surrounding whitespace and drops a leading `data:image/<fmt>;base64,`
/// marker, if any.
pub fn strip_data_url_prefix(image: &str) -> &str {
    let image = image.trim();
    lazy_static! {
        static ref DATA_URL_RE: Regex =
            Regex::new(r"^data:image/[A-Za-z0-9.+-]+;base64,").unwrap();
    }
    match DATA_URL_RE.find(image) {
        Some(m) => &image[m.end()..],
        None => image,
    }
}

fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

pub fn build_prompt(req: &StylingRequest) -> String {
    let tones = SkinTone::ALL
        .iter()
        .map(SkinTone::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let event = or_default(Some(req.event_details.as_str()), "not specified");
    let budget = or_default(req.budget.as_deref(), "no specific budget");
    let colors = or_default(req.color_preference.as_deref(), "no specific color preference");

    format!(
        r#"You are a professional fashion stylist and color theory expert.

1. Analyze the uploaded image to detect the person's skin tone. Answer with exactly one of: {tones}.
2. Based on the detected skin tone and the details below, generate a personalized styling recommendation.

User details:
- Gender: {gender}
- Age: {age}
- Occasion: {occasion}
- Event details: {event}
- Budget: {budget}
- Color preference: {colors}

Provide:
- Detected Skin Tone
- Outfit suggestion (Top, Bottom, Shoes)
- Accessories list
- Hairstyle recommendation
- Color palette (Primary, Secondary, Accent)
- Detailed explanation of why these colors and styles suit this skin tone, age and occasion
- Exactly {count} shopping search keywords suitable for Indian e-commerce websites (Amazon.in, Myntra, Ajio, Nykaa Fashion)
"#,
        gender = req.gender.as_str(),
        age = req.age.trim(),
        occasion = req.occasion.as_str(),
        count = SHOPPING_KEYWORD_COUNT,
    )
}

/// Output schema in the Gemini `responseSchema` dialect.
pub fn response_schema() -> Value {
    let tones: Vec<&str> = SkinTone::ALL.iter().map(SkinTone::as_str).collect();
    let color = json!({ "type": "STRING", "description": "Hex code or color name" });
    json!({
        "type": "OBJECT",
        "properties": {
            "detectedSkinTone": {
                "type": "STRING",
                "enum": tones
            },
            "outfit": {
                "type": "OBJECT",
                "properties": {
                    "top": { "type": "STRING" },
                    "bottom": { "type": "STRING" },
                    "shoes": { "type": "STRING" }
                },
                "required": ["top", "bottom", "shoes"]
            },
            "accessories": { "type": "ARRAY", "items": { "type": "STRING" } },
            "hairstyle": { "type": "STRING" },
            "colorPalette": {
                "type": "OBJECT",
                "properties": {
                    "primary": color,
                    "secondary": color,
                    "accent": color
                },
                "required": ["primary", "secondary", "accent"]
            },
            "explanation": { "type": "STRING" },
            "shoppingKeywords": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": SHOPPING_KEYWORD_COUNT,
                "maxItems": SHOPPING_KEYWORD_COUNT
            }
        },
        "required": [
            "detectedSkinTone",
            "outfit",
            "accessories",
            "hairstyle",
            "colorPalette",
            "explanation",
            "shoppingKeywords"
        ]
    })
}

#[cfg(test)]
mod prompt_tests {
    use super::*;
    use crate::styling::types::fixtures;

    #[test]
    fn strips_known_prefixes() {
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("data:image/png;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("data:image/webp;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("data:image/svg+xml;base64,QUJD"), "QUJD");
    }

    #[test]
    fn stripping_is_idempotent() {
        let once = strip_data_url_prefix("data:image/jpg;base64,QUJD");
        assert_eq!(strip_data_url_prefix(once), once);
        assert_eq!(strip_data_url_prefix("QUJD"), "QUJD");
    }

    #[test]
    fn strips_prefix_behind_surrounding_whitespace() {
        assert_eq!(strip_data_url_prefix(" data:image/jpeg;base64,QUJD\n"), "QUJD");
        assert_eq!(strip_data_url_prefix("  QUJD  "), "QUJD");
    }

    #[test]
    fn leaves_non_image_data_urls_alone() {
        let s = "data:text/plain;base64,QUJD";
        assert_eq!(strip_data_url_prefix(s), s);
    }

    #[test]
    fn prompt_embeds_preferences() {
        let prompt = build_prompt(&fixtures::request());
        assert!(prompt.contains("Gender: Female"));
        assert!(prompt.contains("Age: 28"));
        assert!(prompt.contains("Occasion: Party"));
        assert!(prompt.contains("Rooftop birthday dinner"));
        assert!(prompt.contains("Budget: 5000 INR"));
        assert!(prompt.contains("no specific color preference"));
        assert!(prompt.contains("Fair, Medium, Olive, Deep"));
        assert!(prompt.contains("Myntra"));
    }

    #[test]
    fn blank_budget_falls_back() {
        let mut req = fixtures::request();
        req.budget = Some("   ".into());
        assert!(build_prompt(&req).contains("no specific budget"));
    }

    #[test]
    fn schema_constrains_tone_and_keyword_count() {
        let schema = response_schema();
        let tones = schema["properties"]["detectedSkinTone"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(tones.len(), 4);
        let kw = &schema["properties"]["shoppingKeywords"];
        assert_eq!(kw["minItems"], 5);
        assert_eq!(kw["maxItems"], 5);
        assert_eq!(schema["required"].as_array().unwrap().len(), 7);
    }
}
