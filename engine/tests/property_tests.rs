use folio_engine::compiler::postprocess::strip_comment_lines;
use folio_engine::compiler::{compile, CompileOptions};
use folio_engine::deletion::filter_deletions;
use folio_engine::knowledge::{decode_inline_knowledge, encode_inline_knowledge};
use folio_engine::parser::parse_agent_source;
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime")
        .block_on(future)
}

// Lines mixing prose, headings, comments, hashtags and fences
fn message_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ,.]{0,30}",
        "# [a-z ]{0,20}",
        "## [a-z ]{0,20}",
        "#[a-z]{1,10}",
        Just("```".to_string()),
        Just("Rule: ```bash".to_string()),
        Just(String::new()),
        Just("   ".to_string()),
    ]
}

proptest! {
    #[test]
    fn test_comment_stripping_is_idempotent(lines in prop::collection::vec(message_line(), 0..30)) {
        let message = lines.join("\n");
        let once = strip_comment_lines(&message);
        let twice = strip_comment_lines(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_persona_text_is_verbatim(text in "[A-Za-z][A-Za-z0-9 ,.!?']{0,80}") {
        let source = format!("Agent\nPERSONA {}", text);
        let req = block_on(compile(&source, &CompileOptions::default()));
        prop_assert!(req.system_message.contains(text.trim()));
    }

    #[test]
    fn test_parsing_never_panics(source in "(?s).{0,300}") {
        let parsed = parse_agent_source(&source);
        for (i, commitment) in parsed.commitments.iter().enumerate() {
            prop_assert_eq!(commitment.ordinal, i);
        }
    }

    #[test]
    fn test_deletions_never_survive_and_ordinals_ascend(
        lines in prop::collection::vec(
            prop_oneof![
                "RULE (@[abc] )?[a-z]{1,8}",
                "KNOWLEDGE (\\{[abc]\\} )?[a-z]{1,8}",
                "DELETE( @[abc])?",
                "REMOVE \\{[abc]\\}",
            ],
            0..20,
        )
    ) {
        let source = format!("Agent\n{}", lines.join("\n"));
        let kept = filter_deletions(&parse_agent_source(&source).commitments);
        prop_assert!(kept.iter().all(|c| !c.kind.is_deletion()));
        prop_assert!(kept.windows(2).all(|w| w[0].ordinal < w[1].ordinal));
    }

    #[test]
    fn test_inline_knowledge_round_trip(text in "(?s).{0,200}") {
        let encoded = encode_inline_knowledge(&text);
        prop_assert_eq!(decode_inline_knowledge(&encoded), Some(text));
    }
}
