use serde::Serialize;

use super::types::StylingResult;

const EXPLANATION_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ShopSite {
    Amazon,
    Myntra,
    Ajio,
    Nykaa,
}

impl ShopSite {
    pub const ALL: [ShopSite; 4] = [
        ShopSite::Amazon,
        ShopSite::Myntra,
        ShopSite::Ajio,
        ShopSite::Nykaa,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShopSite::Amazon => "Amazon",
            ShopSite::Myntra => "Myntra",
            ShopSite::Ajio => "Ajio",
            ShopSite::Nykaa => "Nykaa",
        }
    }

    pub fn search_url(&self, keyword: &str) -> String {
        let kw = urlencoding::encode(keyword);
        match self {
            ShopSite::Amazon => format!("https://www.amazon.in/s?k={}", kw),
            ShopSite::Myntra => format!("https://www.myntra.com/{}", kw),
            ShopSite::Ajio => format!("https://www.ajio.com/search/?text={}", kw),
            ShopSite::Nykaa => format!(
                "https://www.nykaafashion.com/catalogsearch/result/?q={}",
                kw
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopLink {
    pub site: ShopSite,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordLinks {
    pub keyword: String,
    pub links: Vec<ShopLink>,
}

pub fn keyword_links(result: &StylingResult) -> Vec<KeywordLinks> {
    result
        .shopping_keywords
        .iter()
        .map(|kw| KeywordLinks {
            keyword: kw.clone(),
            links: ShopSite::ALL
                .iter()
                .map(|site| ShopLink {
                    site: *site,
                    url: site.search_url(kw),
                })
                .collect(),
        })
        .collect()
}

pub fn share_text(result: &StylingResult) -> String {
    let event = if result.event_details.trim().is_empty() {
        result.occasion.as_str()
    } else {
        result.event_details.as_str()
    };
    let preview: String = result
        .explanation
        .chars()
        .take(EXPLANATION_PREVIEW_CHARS)
        .collect();

    let mut text = String::from("✨ *My StyleSense Look* ✨\n\n");
    text.push_str(&format!("📅 *Event:* {}\n", event));
    text.push_str(&format!("🧥 *Style:* {}...\n\n", preview));
    text.push_str("🛍️ *Shop this look:*\n");

    for (i, kw) in result.shopping_keywords.iter().enumerate() {
        text.push_str(&format!("\n📌 *{}. {}*\n", i + 1, kw));
        for site in ShopSite::ALL {
            text.push_str(&format!("   • {}: {}\n", site.label(), site.search_url(kw)));
        }
    }

    text.push_str("\nStyled by StyleSense 👗");
    text
}

pub fn whatsapp_link(result: &StylingResult) -> String {
    format!("https://wa.me/?text={}", urlencoding::encode(&share_text(result)))
}
