use std::net::SocketAddr;
use std::path::Path;

use donor_registry::config::ServerConfig;
use donor_registry::http::{router, AppState};
use donor_registry::{DonorStore, Registry};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

struct Response {
    status: u16,
    head: String,
    body: String,
}

impl Response {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body must be json")
    }
}

async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    body: &str,
) -> Response {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nOrigin: http://example.test\r\n"
    );
    if let Some(content_type) = content_type {
        req.push_str(&format!("Content-Type: {content_type}\r\n"));
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status code");
    Response {
        status,
        head: head.to_ascii_lowercase(),
        body: body.to_string(),
    }
}

async fn get(addr: SocketAddr, path: &str) -> Response {
    send(addr, "GET", path, None, "").await
}

async fn post_json(addr: SocketAddr, path: &str, body: &Value) -> Response {
    send(addr, "POST", path, Some(JSON), &body.to_string()).await
}

fn data_file(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("donors.json")
}

async fn spawn_app(dir: &TempDir) -> SocketAddr {
    spawn_app_at(dir, &data_file(dir)).await
}

async fn spawn_app_at(dir: &TempDir, data_file: &Path) -> SocketAddr {
    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&static_dir).expect("static dir");
    std::fs::write(static_dir.join("index.html"), "<h1>Find a donor</h1>").expect("index");
    std::fs::write(static_dir.join("admin.html"), "<h1>Admin</h1>").expect("admin");

    let server = ServerConfig {
        static_dir,
        ..ServerConfig::default()
    };
    let app = router(AppState::new(Registry::open(data_file)), &server);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn register(addr: SocketAddr, name: &str, group: &str, status: &str) -> Value {
    let res = post_json(
        addr,
        "/api/donors",
        &json!({
            "Name": name,
            "Phone_Number": "555-0100",
            "Blood_Group": group,
            "Availability_Status": status,
        }),
    )
    .await;
    assert_eq!(res.status, 201, "register failed: {}", res.body);
    res.json()
}

fn names(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|d| d["Name"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).expect("write data file");
}

#[tokio::test]
async fn status_reports_version_and_count() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;

    let res = get(addr, "/api/status").await;
    assert_eq!(res.status, 200);
    let body = res.json();
    assert_eq!(body["donor_count"], 0);
    assert_eq!(body["status"], "Server is running.");
    assert_eq!(body["app_version"], env!("CARGO_PKG_VERSION"));

    register(addr, "Anna", "O+", "Available").await;
    let body = get(addr, "/api/status").await.json();
    assert_eq!(body["donor_count"], 1);
}

#[tokio::test]
async fn register_assigns_ids_normalizes_and_persists() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;

    let first = post_json(
        addr,
        "/api/donors/register",
        &json!({"Name": " Anna ", "Phone_Number": "98765", "Blood_Group": "ab-"}),
    )
    .await;
    assert_eq!(first.status, 201);
    let first = first.json();
    assert_eq!(first["id"], 1);
    assert_eq!(first["Name"], "Anna");
    assert_eq!(first["Blood_Group"], "AB-");
    assert_eq!(first["Availability_Status"], "Available");
    assert_eq!(first["Address"], "");

    let second = register(addr, "Joann", "O+", "unavailable").await;
    assert_eq!(second["id"], 2);
    assert_eq!(second["Availability_Status"], "Unavailable");

    let stored = DonorStore::try_load(data_file(&dir)).expect("data file written");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.donors()[1].name, "Joann");
}

#[tokio::test]
async fn register_accepts_form_with_city() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;

    let res = send(
        addr,
        "POST",
        "/api/donors",
        Some(FORM),
        "Name=Ravi&Phone_Number=12345&Blood_Group=b%2B&City=Pune",
    )
    .await;
    assert_eq!(res.status, 201, "{}", res.body);
    let donor = res.json();
    assert_eq!(donor["Address"], "Pune");
    assert_eq!(donor["Blood_Group"], "B+");
}

#[tokio::test]
async fn register_missing_fields_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;

    let res = post_json(
        addr,
        "/api/donors",
        &json!({"Name": "Anna", "Blood_Group": "O+"}),
    )
    .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.json()["error"], "Missing fields: Phone_Number");

    let res = send(addr, "POST", "/api/donors", Some(JSON), "{not json").await;
    assert_eq!(res.status, 400);
    assert!(res.json()["error"].is_string());

    assert_eq!(get(addr, "/api/status").await.json()["donor_count"], 0);
}

#[tokio::test]
async fn search_semantics() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;

    register(addr, "Anna", "o+", "available").await;
    register(addr, "Joann", "B+", "Available").await;
    register(addr, "Ravi", "O+", "Unavailable").await;

    let all = get(addr, "/api/donors/search").await;
    assert_eq!(all.status, 200);
    assert_eq!(names(&all.json()), vec!["Anna", "Joann", "Ravi"]);

    let blank = get(addr, "/api/donors/search?blood_group=&name=").await;
    assert_eq!(names(&blank.json()), vec!["Anna", "Joann", "Ravi"]);

    let group = get(addr, "/api/donors/search?blood_group=O%2B").await;
    assert_eq!(names(&group.json()), vec!["Anna"]);

    let by_name = get(addr, "/api/donors/search?name=ann").await;
    assert_eq!(names(&by_name.json()), vec!["Anna", "Joann"]);

    let both = get(addr, "/api/donors/search?blood_group=b%2B&name=ANN").await;
    assert_eq!(names(&both.json()), vec!["Joann"]);
}

#[tokio::test]
async fn update_status_workflow() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;
    register(addr, "Anna", "O+", "Available").await;

    let res = post_json(
        addr,
        "/api/donors/update_status",
        &json!({"id": "1", "new_status": "UNAVAILABLE"}),
    )
    .await;
    assert_eq!(res.status, 200, "{}", res.body);
    let body = res.json();
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap_or_default().contains("Unavailable"));
    assert_eq!(body["donor"]["Availability_Status"], "Unavailable");

    let stored = DonorStore::try_load(data_file(&dir)).expect("data file");
    assert_eq!(stored.donors()[0].availability_status, "Unavailable");

    let hidden = get(addr, "/api/donors/search?blood_group=O%2B").await;
    assert!(names(&hidden.json()).is_empty());

    let res = post_json(
        addr,
        "/api/donors/update_status",
        &json!({"id": 1, "new_status": "available"}),
    )
    .await;
    assert_eq!(res.status, 200);
    let visible = get(addr, "/api/donors/search?blood_group=O%2B").await;
    assert_eq!(names(&visible.json()), vec!["Anna"]);
}

#[tokio::test]
async fn update_status_errors() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;
    register(addr, "Anna", "O+", "Available").await;

    let missing = post_json(addr, "/api/donors/update_status", &json!({"id": 1})).await;
    assert_eq!(missing.status, 400);
    assert!(missing.json()["error"]
        .as_str()
        .unwrap_or_default()
        .contains("new_status"));

    let unknown = post_json(
        addr,
        "/api/donors/update_status",
        &json!({"id": 42, "new_status": "Unavailable"}),
    )
    .await;
    assert_eq!(unknown.status, 404);

    let garbage = post_json(
        addr,
        "/api/donors/update_status",
        &json!({"id": "abc", "new_status": "Unavailable"}),
    )
    .await;
    assert_eq!(garbage.status, 404);

    let bad_body = send(addr, "POST", "/api/donors/update_status", Some(JSON), "[").await;
    assert_eq!(bad_body.status, 400);

    let all = get(addr, "/api/donors/search").await.json();
    assert_eq!(all[0]["Availability_Status"], "Available");
}

#[tokio::test]
async fn startup_loads_existing_file_with_bom() {
    let dir = tempdir().expect("tempdir");
    write_file(
        &data_file(&dir),
        "\u{feff}[{\"id\": 7, \"Name\": \"Meera\", \"Phone_Number\": \"1\", \"Blood_Group\": \"A+\", \"Availability_Status\": \"Available\", \"Address\": \"Delhi\"}]",
    );
    let addr = spawn_app(&dir).await;

    assert_eq!(get(addr, "/api/status").await.json()["donor_count"], 1);

    let created = register(addr, "Kiran", "A+", "Available").await;
    assert_eq!(created["id"], 8);
}

#[tokio::test]
async fn startup_tolerates_malformed_file() {
    let dir = tempdir().expect("tempdir");
    write_file(&data_file(&dir), "this is not json");
    let addr = spawn_app(&dir).await;

    assert_eq!(get(addr, "/api/status").await.json()["donor_count"], 0);
    let created = register(addr, "Kiran", "A+", "Available").await;
    assert_eq!(created["id"], 1);
}

#[tokio::test]
async fn static_pages_and_cors() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;

    let index = get(addr, "/").await;
    assert_eq!(index.status, 200);
    assert!(index.body.contains("Find a donor"));

    let admin = get(addr, "/admin").await;
    assert_eq!(admin.status, 200);
    assert!(admin.body.contains("Admin"));

    let api = get(addr, "/api/status").await;
    assert!(api.head.contains("access-control-allow-origin"));
}

#[tokio::test]
async fn rejected_query_string_is_json_error() {
    let dir = tempdir().expect("tempdir");
    let addr = spawn_app(&dir).await;

    let res = get(addr, "/api/donors/search?name=a&name=b").await;
    assert_eq!(res.status, 400);
    assert!(res.head.contains("application/json"));
    assert!(res.json()["error"].is_string());
}

#[tokio::test]
async fn failed_save_is_reported_as_server_error() {
    let dir = tempdir().expect("tempdir");
    write_file(&dir.path().join("blocker"), "not a directory");
    let unwritable = dir.path().join("blocker").join("data").join("donors.json");
    let addr = spawn_app_at(&dir, &unwritable).await;

    let res = post_json(
        addr,
        "/api/donors",
        &json!({"Name": "Anna", "Phone_Number": "1", "Blood_Group": "O+"}),
    )
    .await;
    assert_eq!(res.status, 500);
    assert_eq!(res.json()["error"], "Failed to save donor data.");
    assert!(!res.body.contains("blocker"));

    // The registration is kept in memory.
    assert_eq!(get(addr, "/api/status").await.json()["donor_count"], 1);
}

#[tokio::test]
async fn loosely_typed_records_survive_registration() {
    let dir = tempdir().expect("tempdir");
    write_file(
        &data_file(&dir),
        r#"[{"id": 1, "Name": "Asha", "Phone_Number": 9876543210, "Blood_Group": "O+", "Availability_Status": "Available"},
            {"id": 2, "Name": "Ravi", "Phone_Number": "555", "Blood_Group": "A+", "Availability_Status": "Available"}]"#,
    );
    let addr = spawn_app(&dir).await;
    assert_eq!(get(addr, "/api/status").await.json()["donor_count"], 2);

    let created = register(addr, "Meera", "B+", "Available").await;
    assert_eq!(created["id"], 3);

    let stored = DonorStore::try_load(data_file(&dir)).expect("data file");
    assert_eq!(stored.len(), 3);
    assert_eq!(stored.donors()[0].phone_number, "9876543210");
}
