use confluence_qa::config::Config;
use confluence_qa::pipeline::{DEFAULT_QUESTION, Pipeline};
use httpmock::{Method::GET, Method::POST, MockServer};
use regex::Regex;
use serde_json::json;
use std::io::Cursor;

fn test_config(confluence_url: &str, completion_url: &str) -> Config {
    Config {
        confluence_url: confluence_url.to_string(),
        confluence_username: "qa-bot@example.com".to_string(),
        confluence_api_token: "token".to_string(),
        openai_api_key: "sk-test".to_string(),
        openai_model: None,
        openai_base_url: Some(completion_url.to_string()),
    }
}

async fn run_pipeline(config: &Config, console_input: &str) -> String {
    let pipeline = Pipeline::new(config).expect("pipeline");
    let mut input = Cursor::new(console_input.to_string());
    let mut output = Vec::new();
    pipeline
        .run(&mut input, &mut output)
        .await
        .expect("console run");
    String::from_utf8(output).expect("utf8 console output")
}

#[tokio::test]
async fn full_run_answers_suggested_question_from_fetched_pages() {
    let wiki = MockServer::start_async().await;
    let llm = MockServer::start_async().await;

    let search = wiki
        .mock_async(|when, then| {
            when.method(GET)
                .path("/wiki/rest/api/content/search")
                .query_param("cql", r#"title ~ "proctor" OR text ~ "proctor""#)
                .query_param("limit", "5");
            then.status(200).json_body(json!({
                "results": [
                    { "id": "101", "title": "Proctor Rollout QA" },
                    { "id": "102", "title": "GTM Data Layer" }
                ]
            }));
        })
        .await;

    let fetch_first = wiki
        .mock_async(|when, then| {
            when.method(GET)
                .path("/wiki/rest/api/content/101")
                .query_param("expand", "body.storage");
            then.status(200).json_body(json!({
                "body": { "storage": { "value": "<p>Bucket allocation rules</p>" } }
            }));
        })
        .await;

    let fetch_second = wiki
        .mock_async(|when, then| {
            when.method(GET)
                .path("/wiki/rest/api/content/102")
                .query_param("expand", "body.storage");
            then.status(200).json_body(json!({
                "body": { "storage": { "value": "<p>Data layer schema</p>" } }
            }));
        })
        .await;

    let ask = llm
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Create a QA testing strategy for Proctor Test")
                .body_contains("Bucket allocation rules\\n\\nData layer schema");
            then.status(200).json_body(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "Allocation is deterministic." } }
                ]
            }));
        })
        .await;

    let config = test_config(&wiki.base_url(), &llm.base_url());
    let console = run_pipeline(&config, "Proctor\n1\n").await;

    search.assert_async().await;
    fetch_first.assert_async().await;
    fetch_second.assert_async().await;
    ask.assert_async().await;

    assert!(console.contains("Found 2 relevant pages:"));
    assert!(console.contains("1. Proctor Rollout QA"));
    assert!(console.contains("2. GTM Data Layer"));
    assert!(console.contains("Suggested questions based on found pages:"));
    assert!(console.contains("1. Create a QA testing strategy for Proctor Test"));
    assert!(console.contains("Answer: Summary:\nAllocation is deterministic."));
}

#[tokio::test]
async fn empty_search_reports_no_pages_and_stops() {
    let wiki = MockServer::start_async().await;
    let llm = MockServer::start_async().await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/search");
        then.status(200).json_body(json!({ "results": [] }));
    })
    .await;

    let fetch_any = wiki
        .mock_async(|when, then| {
            when.method(GET)
                .path_matches(Regex::new("^/wiki/rest/api/content/[0-9]+$").unwrap());
            then.status(200).json_body(json!({
                "body": { "storage": { "value": "unused" } }
            }));
        })
        .await;

    let ask_any = llm
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let config = test_config(&wiki.base_url(), &llm.base_url());
    let console = run_pipeline(&config, "nothing here\n").await;

    assert!(console.contains("No pages found!"));
    assert_eq!(fetch_any.hits_async().await, 0);
    assert_eq!(ask_any.hits_async().await, 0);
}

#[tokio::test]
async fn failed_search_reads_as_no_pages() {
    let wiki = MockServer::start_async().await;
    let llm = MockServer::start_async().await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/search");
        then.status(500).body("upstream exploded");
    })
    .await;

    let config = test_config(&wiki.base_url(), &llm.base_url());
    let console = run_pipeline(&config, "anything\n").await;

    assert!(console.contains("No pages found!"));
}

#[tokio::test]
async fn out_of_range_selection_asks_default_question() {
    let wiki = MockServer::start_async().await;
    let llm = MockServer::start_async().await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/search");
        then.status(200).json_body(json!({
            "results": [ { "id": "7", "title": "Release notes" } ]
        }));
    })
    .await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/7");
        then.status(200).json_body(json!({
            "body": { "storage": { "value": "Nothing notable" } }
        }));
    })
    .await;

    let ask = llm
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains(DEFAULT_QUESTION);
            then.status(200).json_body(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "Summary: nothing more to add." } }
                ]
            }));
        })
        .await;

    let config = test_config(&wiki.base_url(), &llm.base_url());
    // "Release notes" has no keywords, so five generic questions apply; 9 is out of range.
    let console = run_pipeline(&config, "release\n9\n").await;

    ask.assert_async().await;
    assert!(console.contains("Invalid question number. Using default question."));
    assert!(console.contains("Answer: Summary: nothing more to add."));
}

#[tokio::test]
async fn failed_fetch_contributes_empty_document_in_order() {
    let wiki = MockServer::start_async().await;
    let llm = MockServer::start_async().await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/search");
        then.status(200).json_body(json!({
            "results": [
                { "id": "201", "title": "Broken page" },
                { "id": "202", "title": "Working page" }
            ]
        }));
    })
    .await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/201");
        then.status(500).body("storage offline");
    })
    .await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/202");
        then.status(200).json_body(json!({
            "body": { "storage": { "value": "<p>Second page text</p>" } }
        }));
    })
    .await;

    // The first document is empty, so the joined context starts with the
    // blank-line separator before the surviving page.
    let ask = llm
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Context: \\n\\nSecond page text");
            then.status(200).json_body(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "Partial answer." } }
                ]
            }));
        })
        .await;

    let config = test_config(&wiki.base_url(), &llm.base_url());
    let console = run_pipeline(&config, "pages\nWhat survived?\n").await;

    ask.assert_async().await;
    assert!(console.contains("Answer: Summary:\nPartial answer."));
}

#[tokio::test]
async fn completion_failure_renders_as_answer_text() {
    let wiki = MockServer::start_async().await;
    let llm = MockServer::start_async().await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/search");
        then.status(200).json_body(json!({
            "results": [ { "id": "301", "title": "QA Strategy" } ]
        }));
    })
    .await;

    wiki.mock_async(|when, then| {
        when.method(GET).path("/wiki/rest/api/content/301");
        then.status(200).json_body(json!({
            "body": { "storage": { "value": "Strategy text" } }
        }));
    })
    .await;

    llm.mock_async(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(503).json_body(json!({
            "error": { "message": "overloaded" }
        }));
    })
    .await;

    let config = test_config(&wiki.base_url(), &llm.base_url());
    let console = run_pipeline(&config, "qa\nWhat is the plan?\n").await;

    assert!(console.contains("Answer: AI error:"));
    assert!(console.contains("overloaded"));
}
