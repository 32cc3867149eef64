use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use git2::{Repository, Signature};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tower::util::ServiceExt;

use git_workbench::routes::{create_router, AppState};

fn app() -> Router {
    create_router(AppState::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Repository created through the API, with an identity configured.
async fn initialized_repo() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let repo_path = path_str(dir.path());

    let (status, _) = post(app(), "/api/v1/repository/init", json!({ "path": repo_path })).await;
    assert_eq!(status, StatusCode::OK);

    let repo = Repository::open(dir.path()).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Api Tester").unwrap();
    config.set_str("user.email", "api@example.com").unwrap();
    (dir, repo_path)
}

async fn commit(repo_path: &str, file: &str, content: &str, message: &str) -> String {
    fs::write(Path::new(repo_path).join(file), content).unwrap();
    let (status, body) = post(
        app(),
        "/api/v1/repository/commit",
        json!({ "repo_path": repo_path, "message": message, "file_paths": [file] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["checksum"].as_str().unwrap().to_string()
}

fn current_branch(repo_path: &str) -> String {
    let repo = Repository::open(repo_path).unwrap();
    let head = repo.head().unwrap();
    head.shorthand().unwrap().to_string()
}

#[tokio::test]
async fn lists_directory_with_parent_link() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    fs::create_dir(dir.path().join("a-folder")).unwrap();

    let uri = format!("/api/v1/filesystem/list?path={}", path_str(dir.path()));
    let (status, body) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["name"], "..");
    assert_eq!(entries[0]["file_type"], "parent");
    assert_eq!(entries[1]["name"], "a-folder");
    assert_eq!(entries[1]["file_type"], "folder");
    assert_eq!(entries[2]["key"], 2);
    assert_eq!(entries[2]["git_type"], "null");
}

#[tokio::test]
async fn listing_missing_directory_is_404() {
    let dir = TempDir::new().unwrap();
    let uri = format!("/api/v1/filesystem/list?path={}/missing", path_str(dir.path()));

    let (status, body) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn commit_shows_up_in_history_and_diff() {
    let (_dir, repo_path) = initialized_repo().await;
    let checksum = commit(&repo_path, "a.txt", "alpha\n", "Add a").await;

    let (status, history) = get(app(), &format!("/api/v1/history?repo_path={}", repo_path)).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["commit_checksum"], checksum.as_str());
    assert_eq!(history[0]["commit_message"], "Add a");
    assert_eq!(history[0]["author"], "Api Tester");
    assert_eq!(history[1]["commit_message"], "Initial commit");

    let uri = format!("/api/v1/commits/{}/files?repo_path={}", checksum, repo_path);
    let (status, files) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(files, json!([{ "file_name": "a.txt", "path": "a.txt", "change_type": "added" }]));

    let uri = format!("/api/v1/commits/{}/data?repo_path={}&file_path=a.txt", checksum, repo_path);
    let (status, data) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data[0]["added_lines"], json!(["alpha"]));
    assert_eq!(data[0]["removed_lines"], json!([]));
}

#[tokio::test]
async fn staged_files_and_listing_status() {
    let (dir, repo_path) = initialized_repo().await;
    fs::write(dir.path().join("staged.txt"), "s").unwrap();
    fs::write(dir.path().join("loose.txt"), "l").unwrap();

    let (status, _) = post(
        app(),
        "/api/v1/index/stage",
        json!({ "repo_path": repo_path, "file_path": "staged.txt" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, staged) = get(app(), &format!("/api/v1/repository/staged?repo_path={}", repo_path)).await;
    assert_eq!(staged.as_array().unwrap().len(), 1);
    assert_eq!(staged[0]["name"], "staged.txt");

    let (_, listing) = get(app(), &format!("/api/v1/filesystem/list?path={}", repo_path)).await;
    let status_of = |name: &str| {
        listing
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["name"] == name)
            .map(|e| e["git_type"].clone())
            .unwrap()
    };
    assert_eq!(status_of("staged.txt"), "staged");
    assert_eq!(status_of("loose.txt"), "untracked");
}

#[tokio::test]
async fn repository_root_searches_ancestors() {
    let (dir, repo_path) = initialized_repo().await;
    fs::create_dir_all(dir.path().join("deep/er")).unwrap();

    let uri = format!("/api/v1/repository/root?path={}/deep/er", repo_path);
    let (status, body) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["git_root_path"], path_str(&dir.path().canonicalize().unwrap()));

    let plain = TempDir::new().unwrap();
    let uri = format!("/api/v1/repository/root?path={}", path_str(plain.path()));
    let (status, _) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn branch_errors_map_to_client_errors() {
    let (_dir, repo_path) = initialized_repo().await;
    let body = json!({ "repo_path": repo_path, "branch_name": "feature" });

    let (status, _) = post(app(), "/api/v1/branches/create", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(app(), "/api/v1/branches/create", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let main = current_branch(&repo_path);
    let (status, body) = post(
        app(),
        "/api/v1/branches/checkout",
        json!({ "repo_path": repo_path, "branch_name": main }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("Already on {}", main));

    let (status, _) = post(
        app(),
        "/api/v1/branches/checkout",
        json!({ "repo_path": repo_path, "branch_name": "ghost" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = get(app(), &format!("/api/v1/branches?repo_path={}", repo_path)).await;
    assert_eq!(list["current"], main.as_str());
    assert!(list["branches"].as_array().unwrap().contains(&json!("feature")));
}

#[tokio::test]
async fn conflicting_merge_returns_409_with_paths() {
    let (_dir, repo_path) = initialized_repo().await;
    commit(&repo_path, "shared.txt", "base\n", "base").await;
    let main = current_branch(&repo_path);

    let repo = Repository::open(&repo_path).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("feature", &head, false).unwrap();

    // Commit on feature without touching the working tree
    let blob = repo.blob(b"feature\n").unwrap();
    let mut builder = repo.treebuilder(Some(&head.tree().unwrap())).unwrap();
    builder.insert("shared.txt", blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();
    let sig = Signature::now("Api Tester", "api@example.com").unwrap();
    repo.commit(Some("refs/heads/feature"), &sig, &sig, "feature edit", &tree, &[&head])
        .unwrap();

    commit(&repo_path, "shared.txt", "main\n", "main edit").await;

    let (status, body) = post(
        app(),
        "/api/v1/branches/merge",
        json!({ "repo_path": repo_path, "branch_name": "feature" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflicts"], json!(["shared.txt"]));

    assert_eq!(current_branch(&repo_path), main);
    assert!(!repo.index().unwrap().has_conflicts());
    assert_eq!(fs::read_to_string(Path::new(&repo_path).join("shared.txt")).unwrap(), "main\n");
}

#[tokio::test]
async fn unknown_commit_is_404_and_plain_directory_is_400() {
    let (_dir, repo_path) = initialized_repo().await;

    let uri = format!("/api/v1/commits/{}?repo_path={}", "a".repeat(40), repo_path);
    let (status, _) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let plain = TempDir::new().unwrap();
    let uri = format!("/api/v1/history?repo_path={}", path_str(plain.path()));
    let (status, _) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn init_at_filesystem_root_is_rejected() {
    let (status, body) = post(app(), "/api/v1/repository/init", json!({ "path": "/" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("root directory"));
}

#[tokio::test]
async fn navigation_stacks_are_per_session() {
    let app = app();

    let (_, view) = post(app.clone(), "/api/v1/navigation/push", json!({ "session": "a", "path": "/one" })).await;
    assert_eq!(view["entries"], json!(["/one"]));
    post(app.clone(), "/api/v1/navigation/push", json!({ "session": "a", "path": "/two" })).await;
    post(app.clone(), "/api/v1/navigation/push", json!({ "session": "b", "path": "/other" })).await;

    let (_, view) = post(app.clone(), "/api/v1/navigation/pop", json!({ "session": "a" })).await;
    assert_eq!(view["popped"], "/two");
    assert_eq!(view["entries"], json!(["/one"]));

    post(app.clone(), "/api/v1/navigation/reset", json!({ "session": "a" })).await;
    let (_, view) = get(app.clone(), "/api/v1/navigation?session=a").await;
    assert_eq!(view["entries"], json!([]));
    let (_, view) = get(app, "/api/v1/navigation?session=b").await;
    assert_eq!(view["entries"], json!(["/other"]));
}
