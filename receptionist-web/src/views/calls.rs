use crate::models::{CallLog, CustomerContext};
use crate::utils::format::{display_value, format_duration, format_timestamp, humanize_key, EMPTY};
use crate::utils::phone::caller_label;

/// One line of the call history table.
#[derive(Debug, Clone)]
pub struct CallRow {
    pub href: String,
    pub caller: String,
    pub when: String,
    pub duration: String,
    pub intent: &'static str,
    pub outcome: &'static str,
    pub outcome_class: &'static str,
}

impl CallRow {
    pub fn new(call: &CallLog) -> Self {
        Self {
            href: format!("/dashboard/calls/{}", call.id),
            caller: caller_label(call.caller_number.as_deref()),
            when: format_timestamp(&call.timestamp),
            duration: format_duration(call.duration_seconds),
            intent: call.intent.label(),
            outcome: call.outcome.label(),
            outcome_class: call.outcome.badge_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Interaction {
    pub channel: String,
    pub when: String,
    pub summary: String,
}

/// Everything the call detail page shows.
#[derive(Debug, Clone)]
pub struct CallDetail {
    pub row: CallRow,
    pub confidence: String,
    pub tool_called: String,
    pub transfer_reason: String,
    pub fallback_used: bool,
    pub work_order_id: String,
    pub slots: Vec<Field>,
    pub tool_results: Vec<Field>,
    pub customer_name: String,
    pub history: Vec<Interaction>,
    /// Whether the caller number could be looked up at all.
    pub has_caller_number: bool,
}

pub const HISTORY_LIMIT: usize = 10;

impl CallDetail {
    pub fn new(call: &CallLog, context: Option<&CustomerContext>) -> Self {
        let history = context
            .map(|ctx| {
                ctx.recent_interactions(HISTORY_LIMIT)
                    .into_iter()
                    .map(|record| Interaction {
                        channel: humanize_key(&record.channel),
                        when: format_timestamp(&record.timestamp),
                        summary: record
                            .summary
                            .clone()
                            .or_else(|| record.intent.clone())
                            .or_else(|| record.outcome.clone())
                            .unwrap_or_else(|| EMPTY.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            row: CallRow::new(call),
            confidence: format!("{}%", call.confidence_percent()),
            tool_called: call.tool_called.clone().unwrap_or_else(|| EMPTY.to_string()),
            transfer_reason: call
                .transfer_reason
                .clone()
                .unwrap_or_else(|| EMPTY.to_string()),
            fallback_used: call.fallback_used,
            work_order_id: call
                .work_order_id
                .clone()
                .unwrap_or_else(|| EMPTY.to_string()),
            slots: fields(&call.slots),
            tool_results: fields(&call.tool_results),
            customer_name: context
                .and_then(|ctx| ctx.customer_name())
                .unwrap_or("")
                .to_string(),
            history,
            has_caller_number: call
                .caller_number
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty()),
        }
    }
}

fn fields(map: &std::collections::BTreeMap<String, serde_json::Value>) -> Vec<Field> {
    map.iter()
        .map(|(key, value)| Field {
            name: humanize_key(key),
            value: display_value(value),
        })
        .collect()
}
