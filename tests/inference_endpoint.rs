use codegenie::{ErrorKind, GenieConfig, GenieError, InferenceClient, Language, Orchestrator, Transport};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/codellama/CodeLlama-34b-Instruct-hf";

fn config_for(server: &MockServer) -> GenieConfig {
    GenieConfig {
        endpoint: format!("{}{MODEL_PATH}", server.uri()),
        token: Some("hf_test_token".to_string()),
        ..GenieConfig::default()
    }
}

#[tokio::test]
async fn sends_bearer_token_and_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("authorization", "Bearer hf_test_token"))
        .and(body_partial_json(json!({
            "inputs": "<s>[INST] hello [/INST]",
            "parameters": {
                "max_length": 1024,
                "return_full_text": false,
                "stop": ["</s>", "[INST]"],
                "num_return_sequences": 1,
                "do_sample": true,
                "use_cache": true
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "generated_text": "hi there" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = InferenceClient::new(&config_for(&server)).unwrap();
    let text = client.complete("<s>[INST] hello [/INST]").await.unwrap();
    assert_eq!(text, "hi there");
}

#[tokio::test]
async fn error_status_surfaces_code_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Model is currently loading"))
        .mount(&server)
        .await;

    let client = InferenceClient::new(&config_for(&server)).unwrap();
    let err = client.complete("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    match err {
        GenieError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "Model is currently loading");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn generate_runs_both_steps_against_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("Write a Python function that reverse a string"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "generated_text": "Here it is:\n```python\ndef reverse(s):\n    return s[::-1]\n```"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Explain this Python code"))
        .and(body_string_contains("return s[::-1]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generated_text": "Reverses the string with a slice."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(InferenceClient::new(&config_for(&server)).unwrap());
    let result = orchestrator
        .generate("reverse a string", Language::Python)
        .await
        .unwrap();
    assert_eq!(result.code, "def reverse(s):\n    return s[::-1]");
    assert_eq!(result.explanation, "Reverses the string with a slice.");
}

#[tokio::test]
async fn empty_generated_text_fails_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": "" }])))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(InferenceClient::new(&config_for(&server)).unwrap());
    let err = orchestrator
        .generate("reverse a string", Language::Python)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResult);
}

#[tokio::test]
async fn empty_input_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(InferenceClient::new(&config_for(&server)).unwrap());
    let err = orchestrator.explain("  ", Language::Java).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    // bind then drop to get a local port nobody listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = GenieConfig {
        endpoint: format!("http://127.0.0.1:{port}{MODEL_PATH}"),
        token: Some("hf_test_token".to_string()),
        ..GenieConfig::default()
    };
    let client = InferenceClient::new(&config).unwrap();
    let err = client.complete("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(err, GenieError::Network(_)), "{err}");
}

#[tokio::test]
async fn token_validation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer good"))
        .and(body_partial_json(json!({ "inputs": "test" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": "ok" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer bad"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = InferenceClient::new(&config_for(&server)).unwrap();
    client.validate_token("good").await.unwrap();
    let err = client.validate_token("bad").await.unwrap_err();
    assert!(matches!(err, GenieError::InvalidToken(401)));
    assert_eq!(err.kind(), ErrorKind::Credential);
}
