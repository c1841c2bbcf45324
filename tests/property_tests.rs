//! Property-based tests for reconstruction and rendering invariants.
//!
//! Tests validate:
//! 1. Identifier constructors reject empty or unsafe strings
//! 2. Stream fragments sharing a correlation id merge into one turn, in order
//! 3. Every undecodable line is reported once with its line number
//! 4. Escaped text never contains markup characters
//! 5. Rendering the same conversation twice yields identical bytes

use ccbook::model::{AgentId, RenderableBlock, Role, SessionId};
use ccbook::reconstruct::reconstruct_bytes;
use ccbook::render::html::escape_html;
use ccbook::render::{render, RenderOptions};
use ccbook::resolver::ResolvedConversation;
use proptest::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn user_line(session: &str, text: &str, second: u32) -> String {
    json!({
        "type": "user",
        "sessionId": session,
        "timestamp": format!("2026-03-01T09:00:{:02}Z", second % 60),
        "message": {"role": "user", "content": text},
    })
    .to_string()
}

fn assistant_line(session: &str, request_id: &str, text: &str, second: u32) -> String {
    json!({
        "type": "assistant",
        "sessionId": session,
        "requestId": request_id,
        "timestamp": format!("2026-03-01T09:00:{:02}Z", second % 60),
        "message": {"role": "assistant", "content": [{"type": "text", "text": text}]},
    })
    .to_string()
}

fn joined_text(blocks: &[RenderableBlock]) -> String {
    blocks
        .iter()
        .filter_map(|b| match b {
            RenderableBlock::Text(t) => Some(t.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== Property 1: Identifier Constructors =====

proptest! {
    #[test]
    fn session_id_accepts_exactly_non_empty(s in any::<String>()) {
        prop_assert_eq!(SessionId::new(s.clone()).is_ok(), !s.is_empty());
    }

    #[test]
    fn agent_id_accepts_exactly_file_safe_names(s in any::<String>()) {
        let file_safe = !s.is_empty()
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        prop_assert_eq!(AgentId::new(s.clone()).is_ok(), file_safe);
    }

    #[test]
    fn agent_id_accepts_generated_file_safe_names(s in "[A-Za-z0-9_-]{1,16}") {
        prop_assert!(AgentId::new(s.clone()).is_ok(), "rejected {:?}", s);
    }
}

// ===== Property 2: Fragment Merging =====

proptest! {
    #[test]
    fn fragments_with_one_correlation_id_form_one_turn(
        fragments in prop::collection::vec("[a-z]{1,8}", 1..12)
    ) {
        // GIVEN: a question followed by N fragments of one response
        let mut log = user_line("prop-1", "question", 0);
        log.push('\n');
        for (i, fragment) in fragments.iter().enumerate() {
            log.push_str(&assistant_line("prop-1", "req-1", fragment, i as u32 + 1));
            log.push('\n');
        }

        // WHEN: reconstructed
        let conversation = reconstruct_bytes(log.as_bytes(), "prop-1").conversation;

        // THEN: exactly one assistant turn holding every fragment in order
        let turns = conversation.turns();
        prop_assert_eq!(turns.len(), 2);
        prop_assert_eq!(turns[1].role(), Role::Assistant);
        let text = joined_text(turns[1].blocks());
        let mut cursor = 0;
        for fragment in &fragments {
            let found = text[cursor..].find(fragment.as_str());
            prop_assert!(found.is_some(), "fragment {:?} missing after {}", fragment, cursor);
            cursor += found.unwrap_or(0) + fragment.len();
        }
    }

    #[test]
    fn alternating_correlation_ids_never_merge(count in 1usize..8) {
        // GIVEN: user / assistant pairs, each response with its own id
        let mut log = String::new();
        for i in 0..count {
            log.push_str(&user_line("prop-2", &format!("q{}", i), i as u32 * 2));
            log.push('\n');
            log.push_str(&assistant_line("prop-2", &format!("req-{}", i), &format!("a{}", i), i as u32 * 2 + 1));
            log.push('\n');
        }

        let conversation = reconstruct_bytes(log.as_bytes(), "prop-2").conversation;

        // THEN: one turn per record, roles alternating
        prop_assert_eq!(conversation.turns().len(), count * 2);
        for (i, turn) in conversation.turns().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            prop_assert_eq!(turn.role(), expected);
        }
    }
}

// ===== Property 3: Malformed Lines =====

proptest! {
    #[test]
    fn each_garbage_line_is_reported_with_its_number(
        garbage in prop::collection::vec(any::<bool>(), 1..20)
    ) {
        // GIVEN: a mix of valid user lines and undecodable ones
        let mut log = String::new();
        let mut expected_lines = Vec::new();
        let mut valid = 0;
        for (i, is_garbage) in garbage.iter().enumerate() {
            if *is_garbage {
                log.push_str("{broken record");
                expected_lines.push(i + 1);
            } else {
                log.push_str(&user_line("prop-3", &format!("m{}", i), i as u32));
                valid += 1;
            }
            log.push('\n');
        }

        // WHEN: reconstructed
        let reconstruction = reconstruct_bytes(log.as_bytes(), "prop-3");

        // THEN: garbage is reported, everything else survives
        let reported: Vec<usize> = reconstruction
            .malformed
            .iter()
            .map(|m| m.line_number())
            .collect();
        prop_assert_eq!(reported, expected_lines);
        prop_assert_eq!(reconstruction.conversation.turns().len(), valid);
    }
}

// ===== Property 4: Escaping =====

proptest! {
    #[test]
    fn escaped_text_has_no_markup_characters(s in any::<String>()) {
        let escaped = escape_html(&s);
        prop_assert!(!escaped.contains(['<', '>', '"', '\'']));
        // Every ampersand starts an entity
        for (i, _) in escaped.match_indices('&') {
            let rest = &escaped[i..];
            prop_assert!(
                ["&amp;", "&lt;", "&gt;", "&quot;", "&#x27;"].iter().any(|e| rest.starts_with(e)),
                "bare ampersand in {:?}", escaped
            );
        }
    }
}

// ===== Property 5: Deterministic Rendering =====

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn rendering_twice_is_byte_identical(
        messages in prop::collection::vec("[ -~]{0,40}", 1..6)
    ) {
        let mut log = String::new();
        for (i, message) in messages.iter().enumerate() {
            log.push_str(&assistant_line("prop-5", &format!("req-{}", i), message, i as u32));
            log.push('\n');
        }
        let conversation = reconstruct_bytes(log.as_bytes(), "prop-5").conversation;
        let resolved = ResolvedConversation::leaf(conversation);
        let options = RenderOptions::default();

        let out_a = TempDir::new().unwrap();
        let out_b = TempDir::new().unwrap();
        let a = render(&resolved, out_a.path(), &options).unwrap();
        let b = render(&resolved, out_b.path(), &options).unwrap();

        prop_assert_eq!(a.primary.file_name(), b.primary.file_name());
        prop_assert_eq!(fs::read(&a.primary).unwrap(), fs::read(&b.primary).unwrap());
    }
}
