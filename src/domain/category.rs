use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CategoryStyle {
    pub key: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_STYLE: CategoryStyle = CategoryStyle {
    key: "other",
    icon: "📌",
    label: "Other",
};

const CATEGORIES: &[CategoryStyle] = &[
    CategoryStyle { key: "cleaning", icon: "🧹", label: "Cleaning" },
    CategoryStyle { key: "moving", icon: "📦", label: "Moving" },
    CategoryStyle { key: "assembly", icon: "🔧", label: "Furniture assembly" },
    CategoryStyle { key: "repair", icon: "🛠️", label: "Repairs" },
    CategoryStyle { key: "gardening", icon: "🌱", label: "Gardening" },
    CategoryStyle { key: "delivery", icon: "🚚", label: "Delivery" },
    CategoryStyle { key: "pet-care", icon: "🐕", label: "Pet care" },
    CategoryStyle { key: "tutoring", icon: "📚", label: "Tutoring" },
    CategoryStyle { key: "tech-help", icon: "💻", label: "Tech help" },
    CategoryStyle { key: "painting", icon: "🎨", label: "Painting" },
    CategoryStyle { key: "babysitting", icon: "👶", label: "Babysitting" },
    CategoryStyle { key: "cooking", icon: "🍳", label: "Cooking" },
];

/// Look up the glyph and label for a category, falling back to [`DEFAULT_STYLE`].
pub fn style_for(category: Option<&str>) -> CategoryStyle {
    category
        .map(|key| key.trim().to_ascii_lowercase())
        .and_then(|key| CATEGORIES.iter().find(|style| style.key == key).copied())
        .unwrap_or(DEFAULT_STYLE)
}

pub fn icon_for(category: Option<&str>) -> &'static str {
    style_for(category).icon
}

pub fn all() -> &'static [CategoryStyle] {
    CATEGORIES
}
