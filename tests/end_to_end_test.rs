//! Boots all four services on ephemeral ports, with a mock SMS gateway, and
//! drives the customer journey over real HTTP.

use axum::Router;
use mmo_sandbox::config::Config;
use mmo_sandbox::{
    create_engine_app, create_mmo_app, create_proxy_app, create_token_app, EngineState, MmoState,
    ProxyState, TokenState,
};
use serde_json::{json, Value};

struct Sandbox {
    config: Config,
    client: reqwest::Client,
    _sms_gateway: mockito::ServerGuard,
}

impl Sandbox {
    async fn start() -> Self {
        let mut sms_gateway = mockito::Server::new_async().await;
        sms_gateway
            .mock("POST", "/sms/send")
            .with_status(200)
            .expect_at_least(0)
            .create_async()
            .await;

        let token_listener = bind();
        let mmo_listener = bind();
        let engine_listener = bind();
        let proxy_listener = bind();

        let config = Config {
            token_port: token_listener.local_addr().unwrap().port(),
            mmo_port: mmo_listener.local_addr().unwrap().port(),
            engine_port: engine_listener.local_addr().unwrap().port(),
            proxy_port: proxy_listener.local_addr().unwrap().port(),
            token_url: url_of(&token_listener),
            mmo_url: url_of(&mmo_listener),
            engine_url: url_of(&engine_listener),
            proxy_url: url_of(&proxy_listener),
            sms_gateway_url: sms_gateway.url(),
            otp_digits: 4,
            mock_phone_prefix: "+4416329".to_string(),
            session_idle_secs: 60,
            session_sweep_secs: 60,
            account_wipe_schedule: "0 0 * * * *".to_string(),
        };

        serve(token_listener, create_token_app(TokenState::new()));
        serve(mmo_listener, create_mmo_app(MmoState::from_config(&config)));
        serve(
            engine_listener,
            create_engine_app(EngineState::from_config(&config)),
        );
        serve(
            proxy_listener,
            create_proxy_app(ProxyState::from_config(&config)),
        );

        Self {
            config,
            client: reqwest::Client::new(),
            _sms_gateway: sms_gateway,
        }
    }

    async fn create_account(&self, nick_name: &str, phone_number: &str) -> Value {
        let response = self
            .client
            .post(format!("{}/accounts", self.config.mmo_url))
            .json(&json!({"nickName": nick_name, "phoneNumber": phone_number}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        response.json().await.unwrap()
    }

    async fn stage_operation(&self, otp: u64, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/operations", self.config.proxy_url))
            .header("sessionId", otp.to_string())
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn agent_view(&self) -> Value {
        self.client
            .get(format!("{}/operations/agent", self.config.proxy_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

fn bind() -> std::net::TcpListener {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    listener
}

fn url_of(listener: &std::net::TcpListener) -> String {
    format!("http://{}", listener.local_addr().unwrap())
}

fn serve(listener: std::net::TcpListener, app: Router) {
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());
    tokio::spawn(async move {
        let _ = server.await;
    });
}

#[tokio::test]
async fn accepted_cash_in_lands_as_a_pending_transaction() {
    let sandbox = Sandbox::start().await;

    let account = sandbox.create_account("Test", "+441632960067").await;
    assert_eq!(account["indicative"], "+44");
    let otp = account["otp"].as_u64().unwrap();
    assert!((1000..10_000).contains(&otp));

    let staged = sandbox
        .stage_operation(
            otp,
            json!({
                "type": "cash-in",
                "amount": 100,
                "identifier": "+441632960067",
                "system": "mock"
            }),
        )
        .await;
    assert_eq!(staged.status(), 201);
    let operation: Value = staged.json().await.unwrap();
    assert_eq!(operation["identifierType"], "phoneNumber");
    assert_eq!(operation["customerInfo"], "Test");

    let view = sandbox.agent_view().await;
    assert_eq!(view["operations"].as_array().unwrap().len(), 1);

    let managed = sandbox
        .client
        .post(format!(
            "{}/operations/accept/{}",
            sandbox.config.proxy_url,
            operation["id"].as_str().unwrap()
        ))
        .header("sessionId", otp.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(managed.status(), 200);
    let decision: Value = managed.json().await.unwrap();
    assert_eq!(decision["status"], "pending");

    // The accepted operation is out of the staging area.
    let view = sandbox.agent_view().await;
    assert!(view["operations"].as_array().unwrap().is_empty());

    // And landed in the MMO ledger as a pending transaction.
    let transaction = sandbox
        .client
        .get(format!(
            "{}/transactions/+441632960067/pending",
            sandbox.config.mmo_url
        ))
        .header("sessionId", otp.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(transaction.status(), 200);
    let transaction: Value = transaction.json().await.unwrap();
    assert_eq!(transaction["type"], "deposit");
    assert_eq!(transaction["status"], "pending");
    assert_eq!(transaction["otp"].as_u64().unwrap(), otp);
}

#[tokio::test]
async fn rejected_operation_becomes_an_agent_notification() {
    let sandbox = Sandbox::start().await;

    let account = sandbox.create_account("Test", "+441632960068").await;
    let otp = account["otp"].as_u64().unwrap();

    let staged = sandbox
        .stage_operation(
            otp,
            json!({
                "type": "cash-out",
                "amount": 50,
                "identifier": "+441632960068",
                "system": "mock"
            }),
        )
        .await;
    let operation: Value = staged.json().await.unwrap();
    let id = operation["id"].as_str().unwrap().to_string();

    let managed = sandbox
        .client
        .post(format!(
            "{}/operations/reject/{}",
            sandbox.config.proxy_url, id
        ))
        .header("sessionId", otp.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(managed.status(), 200);
    let decision: Value = managed.json().await.unwrap();
    assert_eq!(decision["status"], "reject");

    let view = sandbox.agent_view().await;
    assert!(view["operations"].as_array().unwrap().is_empty());
    let notifications = view["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0]["message"]
        .as_str()
        .unwrap()
        .contains("rejected"));

    // A second decision on the same id is gone.
    let again = sandbox
        .client
        .post(format!(
            "{}/operations/accept/{}",
            sandbox.config.proxy_url, id
        ))
        .header("sessionId", otp.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 404);
}

#[tokio::test]
async fn invalid_system_is_rejected_without_staging_anything() {
    let sandbox = Sandbox::start().await;

    let account = sandbox.create_account("Test", "+441632960069").await;
    let otp = account["otp"].as_u64().unwrap();

    let staged = sandbox
        .stage_operation(
            otp,
            json!({
                "type": "cash-in",
                "amount": 100,
                "identifier": "+441632960069",
                "system": "production"
            }),
        )
        .await;
    assert_eq!(staged.status(), 400);
    let body: Value = staged.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("system:"));

    let view = sandbox.agent_view().await;
    assert!(view["operations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_session_header_is_a_bad_request() {
    let sandbox = Sandbox::start().await;

    let response = sandbox
        .client
        .post(format!("{}/operations", sandbox.config.proxy_url))
        .json(&json!({
            "type": "cash-in",
            "amount": 100,
            "identifier": "+441632960067",
            "system": "mock"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn sms_commands_drive_the_token_lifecycle() {
    let sandbox = Sandbox::start().await;

    let account = sandbox.create_account("Test", "+441632960070").await;
    let otp = account["otp"].as_u64().unwrap();

    let reply = sandbox
        .client
        .post(format!("{}/messages/sms", sandbox.config.proxy_url))
        .header("sessionId", otp.to_string())
        .json(&json!({"message": "GET_TOKEN"}))
        .send()
        .await
        .unwrap();
    assert_eq!(reply.status(), 200);
    let reply: Value = reply.json().await.unwrap();
    let text = reply["message"].as_str().unwrap();
    assert!(text.starts_with("Your token is +44"));
    let token = text.rsplit(' ').next().unwrap().to_string();

    // The token resolves back to the account.
    let resolved = sandbox
        .client
        .get(format!("{}/accounts/{}", sandbox.config.mmo_url, token))
        .send()
        .await
        .unwrap();
    assert_eq!(resolved.status(), 200);
    let resolved: Value = resolved.json().await.unwrap();
    assert_eq!(resolved["phoneNumber"], "+441632960070");

    // The latest reply is kept for polling.
    let latest = sandbox
        .client
        .get(format!("{}/messages", sandbox.config.proxy_url))
        .header("sessionId", otp.to_string())
        .send()
        .await
        .unwrap();
    let latest: Value = latest.json().await.unwrap();
    assert_eq!(latest["message"].as_str().unwrap(), text);

    // USSD renewal invalidates the old token.
    let renewed = sandbox
        .client
        .post(format!("{}/messages/ussd", sandbox.config.proxy_url))
        .header("sessionId", otp.to_string())
        .json(&json!({"message": "*3#"}))
        .send()
        .await
        .unwrap();
    assert_eq!(renewed.status(), 200);
    let renewed: Value = renewed.json().await.unwrap();
    let new_token = renewed["message"]
        .as_str()
        .unwrap()
        .rsplit(' ')
        .next()
        .unwrap()
        .to_string();
    assert_ne!(new_token, token);
}

#[tokio::test]
async fn token_issuance_exposes_only_the_token() {
    let sandbox = Sandbox::start().await;

    let issued = sandbox
        .client
        .get(format!(
            "{}/tokens/+441632960072",
            sandbox.config.token_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(issued.status(), 200);

    let body: Value = issued.json().await.unwrap();
    assert!(body["token"].as_str().unwrap().starts_with("+44"));
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn account_deletion_cascades_to_transactions() {
    let sandbox = Sandbox::start().await;

    let account = sandbox.create_account("Test", "+441632960071").await;
    let otp = account["otp"].as_u64().unwrap();

    let staged = sandbox
        .stage_operation(
            otp,
            json!({
                "type": "cash-in",
                "amount": 25,
                "identifier": "+441632960071",
                "system": "mock"
            }),
        )
        .await;
    let operation: Value = staged.json().await.unwrap();
    sandbox
        .client
        .post(format!(
            "{}/operations/accept/{}",
            sandbox.config.proxy_url,
            operation["id"].as_str().unwrap()
        ))
        .header("sessionId", otp.to_string())
        .send()
        .await
        .unwrap();

    let deleted = sandbox
        .client
        .delete(format!("{}/accounts", sandbox.config.mmo_url))
        .header("sessionId", otp.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);
    let deleted: Value = deleted.json().await.unwrap();
    assert_eq!(deleted["transactionsDropped"].as_u64().unwrap(), 1);

    let gone = sandbox
        .client
        .get(format!(
            "{}/accounts/+441632960071",
            sandbox.config.mmo_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);
}
