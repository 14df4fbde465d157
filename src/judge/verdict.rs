//! Verdict model and the record-parsing boundary.
//!
//! A Verdict is the structured result of one Judge call: a validated success
//! flag plus either an ordered action-item list or a replacement instruction.
//! The success flag is a genuine boolean here; on the wire it may arrive as a
//! JSON boolean or as the literal strings "True"/"true"/"False"/"false", and
//! anything else is rejected as a schema violation rather than being treated
//! as an implicit false.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JudgrError, Result};
use crate::llm::ResponseSchema;

/// Which of the two declared verdict shapes the Judge must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictShape {
    /// success + action_items list
    ActionItems,
    /// success + improved_prompt string
    ImprovedInstruction,
}

impl VerdictShape {
    /// Operation name recorded against the observability sink.
    pub fn call_name(&self) -> &'static str {
        match self {
            VerdictShape::ActionItems => "extract_actions",
            VerdictShape::ImprovedInstruction => "improve_prompt",
        }
    }

    /// JSON schema constraining the Judge's reply to this shape.
    pub fn response_schema(&self) -> ResponseSchema {
        match self {
            VerdictShape::ActionItems => ResponseSchema::new(
                "eval_response",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "success": { "type": "boolean" },
                        "action_items": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["success", "action_items"],
                    "additionalProperties": false
                }),
            ),
            VerdictShape::ImprovedInstruction => ResponseSchema::new(
                "eval_prompt",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "success": { "type": "boolean" },
                        "improved_prompt": { "type": "string" }
                    },
                    "required": ["success", "improved_prompt"],
                    "additionalProperties": false
                }),
            ),
        }
    }
}

/// The Judge's feedback payload, one variant per verdict shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    /// Ordered findings/recommendations
    ActionItems(Vec<String>),
    /// Replacement instruction text
    ImprovedInstruction(String),
}

impl Feedback {
    /// Render the feedback as text for embedding in the next message.
    ///
    /// Action items render as a quoted list so individual findings survive
    /// verbatim into the composed message.
    pub fn render(&self) -> String {
        match self {
            Feedback::ActionItems(items) => {
                let quoted: Vec<String> = items.iter().map(|i| format!("{:?}", i)).collect();
                format!("[{}]", quoted.join(", "))
            }
            Feedback::ImprovedInstruction(text) => text.clone(),
        }
    }

    /// True when there is nothing in the payload.
    pub fn is_empty(&self) -> bool {
        match self {
            Feedback::ActionItems(items) => items.is_empty(),
            Feedback::ImprovedInstruction(text) => text.trim().is_empty(),
        }
    }
}

/// Structured result of one Judge call. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub success: bool,
    pub feedback: Feedback,
}

impl Verdict {
    /// Parse a raw Judge reply into a Verdict of the expected shape.
    ///
    /// Every deviation from the declared shape is a `SchemaViolation`.
    pub fn parse(raw: &str, shape: VerdictShape) -> Result<Verdict> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| JudgrError::SchemaViolation(format!("verdict is not valid JSON: {}", e)))?;

        let obj = value
            .as_object()
            .ok_or_else(|| JudgrError::SchemaViolation("verdict is not a JSON object".to_string()))?;

        let success = parse_success_flag(obj.get("success").ok_or_else(|| {
            JudgrError::SchemaViolation("verdict missing 'success' field".to_string())
        })?)?;

        let feedback = match shape {
            VerdictShape::ActionItems => {
                let items = obj
                    .get("action_items")
                    .ok_or_else(|| {
                        JudgrError::SchemaViolation(
                            "verdict missing 'action_items' field".to_string(),
                        )
                    })?
                    .as_array()
                    .ok_or_else(|| {
                        JudgrError::SchemaViolation("'action_items' is not an array".to_string())
                    })?;

                let mut findings = Vec::with_capacity(items.len());
                for item in items {
                    let text = item.as_str().ok_or_else(|| {
                        JudgrError::SchemaViolation(
                            "'action_items' contains a non-string entry".to_string(),
                        )
                    })?;
                    findings.push(text.to_string());
                }
                Feedback::ActionItems(findings)
            }
            VerdictShape::ImprovedInstruction => {
                let text = obj
                    .get("improved_prompt")
                    .ok_or_else(|| {
                        JudgrError::SchemaViolation(
                            "verdict missing 'improved_prompt' field".to_string(),
                        )
                    })?
                    .as_str()
                    .ok_or_else(|| {
                        JudgrError::SchemaViolation("'improved_prompt' is not a string".to_string())
                    })?;
                Feedback::ImprovedInstruction(text.to_string())
            }
        };

        Ok(Verdict { success, feedback })
    }

    /// Findings, if this verdict carries the action-items shape.
    pub fn action_items(&self) -> Option<&[String]> {
        match &self.feedback {
            Feedback::ActionItems(items) => Some(items),
            Feedback::ImprovedInstruction(_) => None,
        }
    }

    /// A failure verdict with an empty payload gives the loop nothing to feed
    /// back; repeated occurrences indicate a stall.
    pub fn is_empty_failure(&self) -> bool {
        !self.success && self.feedback.is_empty()
    }
}

/// Validate the success flag at the parsing boundary.
///
/// Only a JSON boolean or the exact strings "True"/"true"/"False"/"false"
/// are accepted; anything else is rejected rather than silently treated as
/// a failed evaluation.
fn parse_success_flag(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.as_str() {
            "True" | "true" => Ok(true),
            "False" | "false" => Ok(false),
            other => Err(JudgrError::SchemaViolation(format!(
                "unrecognized success flag: {:?}",
                other
            ))),
        },
        other => Err(JudgrError::SchemaViolation(format!(
            "success flag is neither boolean nor string: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_items_success() {
        let raw = r#"{"success": true, "action_items": []}"#;
        let verdict = Verdict::parse(raw, VerdictShape::ActionItems).unwrap();
        assert!(verdict.success);
        assert_eq!(verdict.action_items(), Some(&[][..]));
    }

    #[test]
    fn test_parse_action_items_failure_with_findings() {
        let raw = r#"{"success": false, "action_items": ["handle indirect answers", "confirm totals"]}"#;
        let verdict = Verdict::parse(raw, VerdictShape::ActionItems).unwrap();
        assert!(!verdict.success);
        let items = verdict.action_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], "handle indirect answers");
    }

    #[test]
    fn test_parse_string_success_flags() {
        for (flag, expected) in [
            ("\"True\"", true),
            ("\"true\"", true),
            ("\"False\"", false),
            ("\"false\"", false),
        ] {
            let raw = format!(r#"{{"success": {}, "action_items": []}}"#, flag);
            let verdict = Verdict::parse(&raw, VerdictShape::ActionItems).unwrap();
            assert_eq!(verdict.success, expected, "flag {}", flag);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_success_flags() {
        // Differently-cased or free-form affirmatives are schema violations,
        // never implicit false.
        for flag in ["\"TRUE\"", "\"yes\"", "\"1\"", "1", "null"] {
            let raw = format!(r#"{{"success": {}, "action_items": []}}"#, flag);
            let result = Verdict::parse(&raw, VerdictShape::ActionItems);
            assert!(
                matches!(result, Err(JudgrError::SchemaViolation(_))),
                "flag {} should be rejected",
                flag
            );
        }
    }

    #[test]
    fn test_parse_missing_fields() {
        let result = Verdict::parse(r#"{"action_items": []}"#, VerdictShape::ActionItems);
        assert!(matches!(result, Err(JudgrError::SchemaViolation(_))));

        let result = Verdict::parse(r#"{"success": true}"#, VerdictShape::ActionItems);
        assert!(matches!(result, Err(JudgrError::SchemaViolation(_))));

        let result = Verdict::parse(r#"{"success": true}"#, VerdictShape::ImprovedInstruction);
        assert!(matches!(result, Err(JudgrError::SchemaViolation(_))));
    }

    #[test]
    fn test_parse_not_json() {
        let result = Verdict::parse("not json at all", VerdictShape::ActionItems);
        assert!(matches!(result, Err(JudgrError::SchemaViolation(_))));
    }

    #[test]
    fn test_parse_non_string_action_item() {
        let raw = r#"{"success": false, "action_items": [42]}"#;
        let result = Verdict::parse(raw, VerdictShape::ActionItems);
        assert!(matches!(result, Err(JudgrError::SchemaViolation(_))));
    }

    #[test]
    fn test_parse_improved_instruction() {
        let raw = r#"{"success": false, "improved_prompt": "Be stricter about tone."}"#;
        let verdict = Verdict::parse(raw, VerdictShape::ImprovedInstruction).unwrap();
        assert!(!verdict.success);
        assert_eq!(
            verdict.feedback,
            Feedback::ImprovedInstruction("Be stricter about tone.".to_string())
        );
        assert!(verdict.action_items().is_none());
    }

    #[test]
    fn test_render_action_items() {
        let feedback = Feedback::ActionItems(vec![
            "first finding".to_string(),
            "second finding".to_string(),
        ]);
        let rendered = feedback.render();
        assert!(rendered.contains("\"first finding\""));
        assert!(rendered.contains("\"second finding\""));
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with(']'));
    }

    #[test]
    fn test_render_improved_instruction() {
        let feedback = Feedback::ImprovedInstruction("new instruction".to_string());
        assert_eq!(feedback.render(), "new instruction");
    }

    #[test]
    fn test_is_empty_failure() {
        let empty_fail = Verdict {
            success: false,
            feedback: Feedback::ActionItems(vec![]),
        };
        assert!(empty_fail.is_empty_failure());

        let fail_with_findings = Verdict {
            success: false,
            feedback: Feedback::ActionItems(vec!["item".to_string()]),
        };
        assert!(!fail_with_findings.is_empty_failure());

        let empty_success = Verdict {
            success: true,
            feedback: Feedback::ActionItems(vec![]),
        };
        assert!(!empty_success.is_empty_failure());

        let blank_instruction = Verdict {
            success: false,
            feedback: Feedback::ImprovedInstruction("   ".to_string()),
        };
        assert!(blank_instruction.is_empty_failure());
    }

    #[test]
    fn test_shape_call_names() {
        assert_eq!(VerdictShape::ActionItems.call_name(), "extract_actions");
        assert_eq!(
            VerdictShape::ImprovedInstruction.call_name(),
            "improve_prompt"
        );
    }

    #[test]
    fn test_shape_schemas() {
        let actions = VerdictShape::ActionItems.response_schema();
        assert_eq!(actions.name, "eval_response");
        assert!(actions.schema["properties"]["action_items"].is_object());

        let prompt = VerdictShape::ImprovedInstruction.response_schema();
        assert_eq!(prompt.name, "eval_prompt");
        assert!(prompt.schema["properties"]["improved_prompt"].is_object());
    }
}
