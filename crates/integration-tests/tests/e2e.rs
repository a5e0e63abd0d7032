//! End-to-end jobs through the HTTP entry point

mod harness;

use harness::{
    backends::{AudioHost, MockModel, SOURCE_AUDIO_BASE64},
    config::ConfigBuilder,
    server::TestServer,
};
use revoice_pipeline::decode_wav;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn word_times() -> Value {
    json!([
        {"word": "turn", "start": 0.0, "end": 0.3},
        {"word": "left", "start": 0.3, "end": 0.7},
        {"word": "at", "start": 0.7, "end": 0.8},
        {"word": "the", "start": 0.8, "end": 0.9},
        {"word": "light", "start": 0.9, "end": 1.4}
    ])
}

/// Key of the only object in `bucket`
fn only_key(server: &TestServer, bucket: &str) -> String {
    let mut keys = server.store().keys(bucket);
    assert_eq!(keys.len(), 1, "expected exactly one object in {bucket}");
    keys.remove(0)
}

// -- Inpainting --

#[tokio::test]
async fn inpaint_job_publishes_stereo_wav() {
    let host = AudioHost::start().await;
    let model = MockModel::returning(json!([48000, [[0.5, -0.5], [0.25, -0.25], [0.0, 0.0]]])).await;
    let temp = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new()
        .with_model(&model.base_url())
        .with_temp_dir(temp.path())
        .build();

    let server = TestServer::start(config).await.unwrap();

    let outcome = server
        .run_sync(&json!({
            "id": "sync-1",
            "input": {
                "audio_url": host.url(),
                "input_text": "turn left at the light",
                "output_text": "turn right at the light",
                "word_times": word_times(),
                "num_steps": 40
            }
        }))
        .await;

    assert_eq!(outcome["status"], "success", "{outcome}");
    assert_eq!(outcome["input_text"], "turn left at the light");
    assert_eq!(outcome["word_times"], word_times());

    let key = only_key(&server, "generated-audio");
    assert_eq!(outcome["audio_url"], format!("https://cdn.example.com/generated-audio/{key}"));

    let object = server.store().object("generated-audio", &key).unwrap();
    assert_eq!(object.content_type, "audio/wav");
    assert!(object.public_read);

    let audio = decode_wav(&object.body).unwrap();
    assert_eq!(audio.sample_rate(), 48000);
    assert_eq!(audio.channels(), 2);
    assert_eq!(audio.frames(), 3);

    let requests = model.requests().await;
    assert_eq!(requests.len(), 1);
    let (endpoint, body) = &requests[0];
    assert_eq!(endpoint, "/inpaint");
    assert_eq!(body["audio_base64"], SOURCE_AUDIO_BASE64);
    assert_eq!(body["output_text"], "turn right at the light");
    assert_eq!(body["num_steps"], 40);
    assert_eq!(body["input_word_times"].as_array().unwrap().len(), 5);

    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn run_route_behaves_like_runsync() {
    let host = AudioHost::start().await;
    let model = MockModel::returning(json!([16000, [0.0, 0.1]])).await;
    let config = ConfigBuilder::new().with_model(&model.base_url()).build();

    let server = TestServer::start(config).await.unwrap();

    let outcome = server
        .submit(
            "/run",
            &json!({
                "input": {
                    "audio_url": host.url(),
                    "input_text": "a",
                    "output_text": "b",
                    "word_times": [{"word": "a", "start": 0, "end": 0.5}]
                }
            }),
        )
        .await;

    assert_eq!(outcome["status"], "success");
}

#[tokio::test]
async fn missing_source_audio_fails_the_job() {
    let host = AudioHost::start().await;
    let model = MockModel::returning(json!([16000, [0.0]])).await;
    let temp = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new()
        .with_model(&model.base_url())
        .with_temp_dir(temp.path())
        .build();

    let server = TestServer::start(config).await.unwrap();

    let outcome = server
        .run_sync(&json!({
            "input": {
                "audio_url": host.missing_url(),
                "input_text": "a",
                "output_text": "b",
                "word_times": [{"word": "a", "start": 0, "end": 0.5}]
            }
        }))
        .await;

    assert_eq!(
        outcome,
        json!({
            "status": "error",
            "message": format!("failed to download audio from {}: HTTP 404", host.missing_url())
        })
    );
    assert!(model.requests().await.is_empty());
    assert_eq!(server.store().object_count(), 0);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn out_of_range_parameters_are_rejected_before_download() {
    let host = AudioHost::start().await;
    let model = MockModel::returning(json!([16000, [0.0]])).await;
    let config = ConfigBuilder::new().with_model(&model.base_url()).build();

    let server = TestServer::start(config).await.unwrap();

    let outcome = server
        .run_sync(&json!({
            "input": {
                "audio_url": host.url(),
                "input_text": "a",
                "output_text": "b",
                "word_times": [{"word": "a", "start": 0, "end": 0.5}],
                "topk": 0
            }
        }))
        .await;

    assert_eq!(outcome["status"], "error");
    assert!(outcome["message"].as_str().unwrap().contains("topk"));
    assert_eq!(host.request_count().await, 0);
}

#[tokio::test]
async fn model_backend_failure_is_reported() {
    let host = AudioHost::start().await;
    let model = MockModel::failing(500, "out of memory").await;
    let temp = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new()
        .with_model(&model.base_url())
        .with_temp_dir(temp.path())
        .build();

    let server = TestServer::start(config).await.unwrap();

    let outcome = server
        .run_sync(&json!({
            "input": {
                "reference_audio_url": host.url(),
                "transcript": "hello"
            }
        }))
        .await;

    assert_eq!(outcome["status"], "error");
    let message = outcome["message"].as_str().unwrap();
    assert!(message.starts_with("model invocation failed"), "{message}");
    assert!(message.contains("out of memory"), "{message}");
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn malformed_model_result_is_reported() {
    let host = AudioHost::start().await;
    let model = MockModel::returning(json!({"sample_rate": 16000})).await;
    let config = ConfigBuilder::new().with_model(&model.base_url()).build();

    let server = TestServer::start(config).await.unwrap();

    let outcome = server
        .run_sync(&json!({
            "input": {
                "reference_audio_url": host.url(),
                "transcript": "hello"
            }
        }))
        .await;

    assert_eq!(outcome["status"], "error");
    assert_eq!(server.store().object_count(), 0);
}

// -- Voice-cloning TTS --

#[tokio::test]
async fn speech_job_notifies_default_webhook() {
    let host = AudioHost::start().await;
    let model = MockModel::returning(json!([24000, [0.1, 0.2, 0.3]])).await;
    let webhook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/complete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&webhook)
        .await;

    let config = ConfigBuilder::new()
        .with_model(&model.base_url())
        .with_default_webhook(&format!("{}/complete", webhook.uri()))
        .with_tts_prefix("voices/")
        .build();

    let server = TestServer::start(config).await.unwrap();

    let outcome = server
        .run_sync(&json!({
            "input": {
                "reference_audio_url": host.url(),
                "transcript": "see you tomorrow",
                "userid": "user-99"
            }
        }))
        .await;

    assert_eq!(outcome["status"], "success");
    assert_eq!(outcome["transcript"], "see you tomorrow");

    let key = only_key(&server, "generated-audio");
    assert!(key.starts_with("voices/"));

    let received = webhook.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body, json!({"userid": "user-99", "audio_url": outcome["audio_url"]}));

    let requests = model.requests().await;
    assert_eq!(requests[0].0, "/synthesize");
    assert_eq!(requests[0].1["reference_audio_base64"], SOURCE_AUDIO_BASE64);
    assert_eq!(requests[0].1["text"], "see you tomorrow");
}

#[tokio::test]
async fn unreachable_webhook_keeps_success() {
    let host = AudioHost::start().await;
    let model = MockModel::returning(json!([24000, [0.1]])).await;
    let config = ConfigBuilder::new().with_model(&model.base_url()).build();

    let server = TestServer::start(config).await.unwrap();

    let outcome = server
        .run_sync(&json!({
            "input": {
                "reference_audio_url": host.url(),
                "transcript": "hello",
                "webhook_url": "http://127.0.0.1:9/hook"
            }
        }))
        .await;

    assert_eq!(outcome["status"], "success");
    let key = only_key(&server, "generated-audio");
    assert_eq!(outcome["audio_url"], format!("https://cdn.example.com/generated-audio/{key}"));
}

// -- Concurrency --

#[tokio::test]
async fn concurrent_jobs_create_one_bucket() {
    let host = AudioHost::start().await;
    let model = MockModel::returning(json!([16000, [0.0, 0.1]])).await;
    let config = ConfigBuilder::new().with_model(&model.base_url()).build();

    let server = TestServer::start(config).await.unwrap();

    let event = json!({
        "input": {
            "reference_audio_url": host.url(),
            "transcript": "hello",
            "bucket_name": "new-bucket"
        }
    });

    let (a, b) = tokio::join!(server.run_sync(&event), server.run_sync(&event));

    assert_eq!(a["status"], "success");
    assert_eq!(b["status"], "success");
    assert_ne!(a["audio_url"], b["audio_url"]);
    assert_eq!(server.store().bucket_creations(), 1);
    assert_eq!(server.store().keys("new-bucket").len(), 2);
}
