//! Tests for the Ollama client against a local stand-in server

#[cfg(test)]
mod client_tests {
    use crate::{Error, GenerationConfig, LLMProvider, OllamaClient, OllamaConfig};
    use insta::assert_yaml_snapshot;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one HTTP request with a canned response and hand back the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower.strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&request).to_string());
        });

        (format!("http://{}", addr), rx)
    }

    #[test]
    fn test_config_snapshot() {
        assert_yaml_snapshot!(OllamaConfig::default(), @r###"
        host: "http://localhost:11434"
        model: llama3
        timeout_secs: 120
        "###);
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = OllamaConfig::new("http://gpu-box:11434", "llama3");
        assert_eq!(config.endpoint("api/generate").unwrap().as_str(), "http://gpu-box:11434/api/generate");

        let proxied = OllamaConfig::new("https://proxy.example.org/ollama", "llama3");
        assert_eq!(
            proxied.endpoint("api/tags").unwrap().as_str(),
            "https://proxy.example.org/ollama/api/tags"
        );
    }

    #[test]
    fn test_invalid_configuration() {
        let bad_host = OllamaConfig::new("not a url", "llama3");
        assert!(matches!(bad_host.validate(), Err(Error::Configuration(_))));

        let bad_scheme = OllamaConfig::new("ftp://localhost", "llama3");
        assert!(matches!(OllamaClient::new(bad_scheme), Err(Error::Configuration(_))));

        let no_model = OllamaConfig::new("http://localhost:11434", " ");
        assert!(matches!(no_model.validate(), Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_generate_posts_prompt_and_reads_response() {
        let (host, request) = serve_once(
            "200 OK",
            r#"{"model":"llama3","response":"ANSWER: Sow wheat in November.","done":true,"eval_count":7}"#,
        )
        .await;
        let client = OllamaClient::new(OllamaConfig::new(host, "llama3")).unwrap();

        let result = client.generate("When to sow wheat?").await.unwrap();
        assert_eq!(result.text, "Sow wheat in November.");
        assert_eq!(result.model_id, "llama3");
        assert_eq!(result.tokens_used, Some(7));

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /api/generate"));
        assert!(raw.contains(r#""prompt":"When to sow wheat?""#));
        assert!(raw.contains(r#""stream":false"#));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_provider_error() {
        let (host, _request) = serve_once("500 Internal Server Error", r#"{"error":"model crashed"}"#).await;
        let client = OllamaClient::new(OllamaConfig::new(host, "llama3")).unwrap();

        match client.generate("anything").await {
            Err(Error::LLMProvider(message)) => assert!(message.contains("model crashed")),
            other => panic!("unexpected result: {:?}", other.map(|r| r.text)),
        }
    }

    #[tokio::test]
    async fn test_connect_checks_model_is_pulled() {
        let (host, _request) = serve_once("200 OK", r#"{"models":[{"name":"llama3:latest"}]}"#).await;
        let mut client = OllamaClient::new(OllamaConfig::new(host, "llama3")).unwrap();
        client.connect().await.unwrap();

        let (host, _request) = serve_once("200 OK", r#"{"models":[{"name":"mistral:7b"}]}"#).await;
        let mut client = OllamaClient::new(OllamaConfig::new(host, "llama3")).unwrap();
        assert!(matches!(client.connect().await, Err(Error::LLMProvider(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_error() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(OllamaConfig::new(format!("http://{}", addr), "llama3")).unwrap();
        let config = GenerationConfig {
            model_id: "llama3".to_string(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        assert!(matches!(
            client.generate_with_config("hi", &config).await,
            Err(Error::Network(_))
        ));
    }
}
