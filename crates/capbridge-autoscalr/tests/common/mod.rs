#![allow(dead_code)]

use async_trait::async_trait;
use capbridge_autoscalr::{ApplicationDefinition, BridgeError, CapacityApi};
use capbridge_config::BridgeConfig;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// 受信したリクエスト
#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

/// 1回だけ応答するHTTPサーバー
pub struct OneShotServer {
    pub url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl OneShotServer {
    pub async fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/autoScalrApp", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                if status == 200 { "OK" } else { "Status" },
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        Self { url, handle }
    }

    /// サーバーが受け取ったリクエストを返す
    pub async fn request(self) -> CapturedRequest {
        self.handle.await.unwrap()
    }
}

async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    let mut content_type = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            if name == "content-length" {
                content_length = value.trim().parse().unwrap();
            } else if name == "content-type" {
                content_type = Some(value.trim().to_string());
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body was complete");
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = serde_json::from_slice(&buf[header_end..header_end + content_length])
        .unwrap_or(serde_json::Value::Null);

    CapturedRequest {
        method,
        path,
        content_type,
        body,
    }
}

/// 接続を拒否するURL
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/autoScalrApp", addr)
}

/// テスト用の設定 (base: m3.large = 2 vCPUs)
pub fn test_config(api_endpoint: &str) -> BridgeConfig {
    let endpoint = api_endpoint.to_string();
    BridgeConfig::from_lookup(move |key| match key {
        "AUTOSCALING_GROUP_NAME" => Some("testASG".to_string()),
        "AWS_REGION" => Some("us-east-1".to_string()),
        "AUTOSCALR_API_KEY" => Some("myApiKey".to_string()),
        "DISPLAY_NAME" => Some("test cluster".to_string()),
        "INSTANCE_TYPES" => Some("m3.large,c3.large".to_string()),
        "TARGET_CAPACITY_INSTANCES" => Some("2".to_string()),
        "AUTOSCALR_API_URL" => Some(endpoint.clone()),
        "AUTOSCALR_CLUSTER_STATE_URL" => Some(endpoint.clone()),
        _ => None,
    })
    .unwrap()
}

/// FakeCapacityApi が受けた呼び出し
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(ApplicationDefinition),
    Get,
    Update(u32),
    DeleteNodes(u32, Vec<String>),
    Delete,
}

/// 呼び出しを記録するインメモリ CapacityApi
#[derive(Default)]
pub struct FakeCapacityApi {
    calls: Mutex<Vec<Call>>,
    definition: Mutex<Option<ApplicationDefinition>>,
    fail_reads: bool,
}

impl FakeCapacityApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の定義を持った状態で開始する
    pub fn with_target(vcpus: u32) -> Self {
        let api = Self::new();
        *api.definition.lock().unwrap() = Some(ApplicationDefinition {
            group_id: "testASG".to_string(),
            region: "us-east-1".to_string(),
            target_capacity: vcpus,
            ..Default::default()
        });
        api
    }

    /// Get が常に通信エラーになる
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn definition(&self) -> Option<ApplicationDefinition> {
        self.definition.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CapacityApi for FakeCapacityApi {
    async fn create(&self, definition: &ApplicationDefinition) -> capbridge_autoscalr::Result<()> {
        self.record(Call::Create(definition.clone()));
        *self.definition.lock().unwrap() = Some(definition.clone());
        Ok(())
    }

    async fn get(&self) -> capbridge_autoscalr::Result<Option<ApplicationDefinition>> {
        self.record(Call::Get);
        if self.fail_reads {
            return Err(BridgeError::Transport {
                status: 500,
                message: "connection refused".to_string(),
            });
        }
        Ok(self.definition())
    }

    async fn update(&self, target_vcpus: u32) -> capbridge_autoscalr::Result<()> {
        self.record(Call::Update(target_vcpus));
        if let Some(definition) = self.definition.lock().unwrap().as_mut() {
            definition.target_capacity = target_vcpus;
        }
        Ok(())
    }

    async fn delete_nodes(
        &self,
        delta_vcpu: u32,
        instance_ids: Vec<String>,
    ) -> capbridge_autoscalr::Result<()> {
        self.record(Call::DeleteNodes(delta_vcpu, instance_ids));
        Ok(())
    }

    async fn delete(&self) -> capbridge_autoscalr::Result<()> {
        self.record(Call::Delete);
        *self.definition.lock().unwrap() = None;
        Ok(())
    }
}
