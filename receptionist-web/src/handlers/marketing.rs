use askama::Template;
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use service_core::{
    error::AppError,
    middleware::rate_limit::{check_ip_rate_limit, client_ip},
};
use std::net::SocketAddr;
use validator::Validate;

use super::{validation_messages, NoticeTemplate};
use crate::models::CallIntent;
use crate::views::billing::{PlanInfo, PLAN_CATALOG};
use crate::AppState;

pub struct Feature {
    pub title: &'static str,
    pub body: &'static str,
}

pub const FEATURES: [Feature; 6] = [
    Feature {
        title: "Answers every call",
        body: "The receptionist picks up on the first ring, day or night, and handles several callers at once.",
    },
    Feature {
        title: "Knows your work orders",
        body: "Connected to Tekmetric or Shop-Ware, it tells customers where their repair stands without a tech leaving the bay.",
    },
    Feature {
        title: "Hands off to your team",
        body: "Callers who ask for a person, or questions it can't answer, go straight to your transfer number.",
    },
    Feature {
        title: "Text summaries",
        body: "Get an SMS after each call with who called, what they needed and how it ended.",
    },
    Feature {
        title: "Books on your calendar",
        body: "Connect Google Calendar and let callers pick a drop-off time that fits your schedule.",
    },
    Feature {
        title: "Call analytics",
        body: "See busy hours, common questions and how many calls were resolved without you picking up.",
    },
];

pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQ: [Faq; 7] = [
    Faq {
        question: "Do I need a new phone number?",
        answer: "No. Forward your existing line, or just the calls you miss, to the number we give you.",
    },
    Faq {
        question: "Which shop management systems do you support?",
        answer: "Tekmetric and Shop-Ware today. Every account can also run on demo data while you try it out.",
    },
    Faq {
        question: "What happens when the AI can't help?",
        answer: "It transfers the caller to your transfer number, or takes a message if nobody answers.",
    },
    Faq {
        question: "Can I pause it?",
        answer: "Yes. One click on the dashboard pauses the receptionist and calls go to your transfer number.",
    },
    Faq {
        question: "What counts toward my minutes?",
        answer: "Time the receptionist spends on a call. Transfers stop the clock once your team picks up.",
    },
    Faq {
        question: "What if I go over my plan?",
        answer: "We warn you at 80% of your allowance. At the limit, calls are transferred to your shop until you upgrade or the period resets.",
    },
    Faq {
        question: "Is there a contract?",
        answer: "No. Plans are month to month and you can change or cancel from the billing page.",
    },
];

#[derive(Template)]
#[template(path = "marketing/home.html")]
pub struct HomeTemplate {
    pub features: &'static [Feature],
}

#[derive(Template)]
#[template(path = "marketing/pricing.html")]
pub struct PricingTemplate {
    pub plans: &'static [PlanInfo],
}

pub struct IntentInfo {
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Template)]
#[template(path = "marketing/features.html")]
pub struct FeaturesTemplate {
    pub features: &'static [Feature],
    pub intents: Vec<IntentInfo>,
}

#[derive(Template)]
#[template(path = "marketing/faq.html")]
pub struct FaqTemplate {
    pub faqs: &'static [Faq],
}

#[derive(Template)]
#[template(path = "marketing/about.html")]
pub struct AboutTemplate;

#[derive(Template)]
#[template(path = "marketing/terms.html")]
pub struct TermsTemplate;

#[derive(Template)]
#[template(path = "marketing/privacy.html")]
pub struct PrivacyTemplate;

#[derive(Template)]
#[template(path = "marketing/contact.html")]
pub struct ContactTemplate {
    pub form: ContactFormTemplate,
}

#[derive(Template, Default)]
#[template(path = "marketing/contact_form.html")]
pub struct ContactFormTemplate {
    pub name: String,
    pub email: String,
    pub shop_name: String,
    pub phone: String,
    pub message: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "marketing/contact_thanks.html")]
pub struct ContactThanksTemplate {
    pub name: String,
}

fn validate_optional_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if phone.trim().is_empty() {
        Ok(())
    } else {
        super::validate_phone(phone)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 100, message = "Please tell us your name"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Shop name must be under 200 characters"))]
    pub shop_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_phone"))]
    pub phone: String,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Message must be between 10 and 2000 characters"
    ))]
    pub message: String,
}

impl ContactFormTemplate {
    fn from_form(form: ContactForm, errors: Vec<String>) -> Self {
        Self {
            name: form.name,
            email: form.email,
            shop_name: form.shop_name,
            phone: form.phone,
            message: form.message,
            errors,
        }
    }
}

pub async fn home() -> impl IntoResponse {
    HomeTemplate {
        features: &FEATURES,
    }
}

pub async fn pricing() -> impl IntoResponse {
    PricingTemplate {
        plans: &PLAN_CATALOG,
    }
}

pub async fn features() -> impl IntoResponse {
    FeaturesTemplate {
        features: &FEATURES,
        intents: CallIntent::configurable()
            .iter()
            .map(|intent| IntentInfo {
                label: intent.label(),
                description: intent.description(),
            })
            .collect(),
    }
}

pub async fn faq() -> impl IntoResponse {
    FaqTemplate { faqs: &FAQ }
}

pub async fn about() -> impl IntoResponse {
    AboutTemplate
}

pub async fn terms() -> impl IntoResponse {
    TermsTemplate
}

pub async fn privacy() -> impl IntoResponse {
    PrivacyTemplate
}

pub async fn contact() -> impl IntoResponse {
    ContactTemplate {
        form: ContactFormTemplate::default(),
    }
}

/// Contact form submission. There is no sales inbox behind this site, so
/// messages are written to the log and acknowledged inline. Only valid
/// submissions count against the sender's allowance.
pub async fn submit_contact(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Form(form): Form<ContactForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        let messages = validation_messages(&errors);
        return ContactFormTemplate::from_form(form, messages).into_response();
    }

    let ip = client_ip(&headers, peer);
    if let Err(AppError::TooManyRequests(message, retry_after)) =
        check_ip_rate_limit(&state.contact_limiter, ip)
    {
        tracing::warn!(client_ip = ?ip, retry_after = ?retry_after, "Contact form rate limited");
        let mut response_headers = HeaderMap::new();
        if let Some(seconds) = retry_after {
            response_headers.insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        return (response_headers, NoticeTemplate::error(message)).into_response();
    }

    tracing::info!(
        name = %form.name.trim(),
        email = %form.email.trim(),
        shop_name = %form.shop_name.trim(),
        phone = %form.phone.trim(),
        message_length = form.message.len(),
        "Contact request received"
    );

    ContactThanksTemplate {
        name: form.name.trim().to_string(),
    }
    .into_response()
}
