use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Non-Binary")]
    NonBinary,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::NonBinary => "Non-Binary",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Occasion {
    Formal,
    Casual,
    Party,
    Business,
}

impl Occasion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Occasion::Formal => "Formal",
            Occasion::Casual => "Casual",
            Occasion::Party => "Party",
            Occasion::Business => "Business",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkinTone {
    Fair,
    Medium,
    Olive,
    Deep,
}

impl SkinTone {
    pub const ALL: [SkinTone; 4] = [
        SkinTone::Fair,
        SkinTone::Medium,
        SkinTone::Olive,
        SkinTone::Deep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinTone::Fair => "Fair",
            SkinTone::Medium => "Medium",
            SkinTone::Olive => "Olive",
            SkinTone::Deep => "Deep",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outfit {
    pub top: String,
    pub bottom: String,
    pub shoes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

/// One styling request as collected from the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylingRequest {
    /// Base64 photo, optionally with a `data:image/...;base64,` prefix.
    #[serde(default)]
    pub image: String,
    pub gender: Gender,
    pub occasion: Occasion,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub event_details: String,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub color_preference: Option<String>,
}

/// The part of a result produced by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StylingAdvice {
    pub detected_skin_tone: SkinTone,
    pub outfit: Outfit,
    pub accessories: Vec<String>,
    pub hairstyle: String,
    pub color_palette: ColorPalette,
    pub explanation: String,
    pub shopping_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StylingResult {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub user_image: String,
    pub detected_skin_tone: SkinTone,
    pub gender: Gender,
    pub occasion: Occasion,
    pub age: String,
    pub event_details: String,
    pub budget: Option<String>,
    pub color_preference: Option<String>,
    pub outfit: Outfit,
    pub accessories: Vec<String>,
    pub hairstyle: String,
    pub color_palette: ColorPalette,
    pub explanation: String,
    pub shopping_keywords: Vec<String>,
}

impl StylingResult {
    /// Stamps the model output with a fresh id and time and echoes the request.
    pub fn from_advice(advice: StylingAdvice, request: &StylingRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: OffsetDateTime::now_utc(),
            user_image: request.image.clone(),
            detected_skin_tone: advice.detected_skin_tone,
            gender: request.gender,
            occasion: request.occasion,
            age: request.age.clone(),
            event_details: request.event_details.clone(),
            budget: request.budget.clone(),
            color_preference: request.color_preference.clone(),
            outfit: advice.outfit,
            accessories: advice.accessories,
            hairstyle: advice.hairstyle,
            color_palette: advice.color_palette,
            explanation: advice.explanation,
            shopping_keywords: advice.shopping_keywords,
        }
    }
}
