use crate::models::ShopSettings;

/// Whether the AI receptionist is currently answering calls for the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopStatus {
    Active,
    Paused,
}

impl ShopStatus {
    pub fn from_settings(settings: &ShopSettings) -> Self {
        if settings.ai_enabled {
            ShopStatus::Active
        } else {
            ShopStatus::Paused
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ShopStatus::Active)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShopStatus::Active => "Active",
            ShopStatus::Paused => "Paused",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ShopStatus::Active => "status-active",
            ShopStatus::Paused => "status-paused",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ShopStatus::Active => "Your AI receptionist is answering calls.",
            ShopStatus::Paused => {
                "Your AI receptionist is paused. Calls go to your transfer number."
            }
        }
    }

    /// Label of the button that flips the state.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            ShopStatus::Active => "Pause AI",
            ShopStatus::Paused => "Resume AI",
        }
    }
}
