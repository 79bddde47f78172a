use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep, timeout};

use taskdeck_core::app::{AttachmentSource, ClientBuilder, SyncProgress, TaskSync};
use taskdeck_core::domain::{NewTask, TaskPatch};
use taskdeck_core::impls::InMemoryBackend;

/// pump ループ：feed の echo をローカルリストに流し込む接着剤
///
/// リストのスナップショット要求は mpsc 経由で受け、イベント処理と同じ
/// タスクで捌く（ローカルリストの所有者は常に 1 つ）。
async fn sync_loop(mut sync: TaskSync, mut snapshots: mpsc::Receiver<mpsc::Sender<String>>) {
    enum Step {
        Pumped(Result<SyncProgress, taskdeck_core::domain::QueryError>),
        Snapshot(Option<mpsc::Sender<String>>),
    }

    loop {
        // select の結果を一度手放してから sync を触る（pump の future が
        // sync を可変借用しているため）
        let step = tokio::select! {
            progress = sync.pump() => Step::Pumped(progress),
            request = snapshots.recv() => Step::Snapshot(request),
        };
        match step {
            Step::Pumped(Ok(SyncProgress::Closed)) | Step::Snapshot(None) => break,
            Step::Pumped(Ok(_)) => {}
            Step::Pumped(Err(error)) => eprintln!("sync error: {error}"),
            Step::Snapshot(Some(reply)) => {
                let rendered = serde_json::to_string_pretty(sync.tasks())
                    .unwrap_or_else(|e| format!("<render error: {e}>"));
                let _ = reply.send(rendered).await;
            }
        }
    }
    sync.close();
}

async fn print_snapshot(snapshots: &mpsc::Sender<mpsc::Sender<String>>, label: &str) {
    let (reply_tx, mut reply_rx) = mpsc::channel(1);
    snapshots.send(reply_tx).await.expect("sync loop alive");
    if let Some(rendered) = reply_rx.recv().await {
        println!("--- {label} ---\n{rendered}");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // (A) バックエンドとクライアントを用意
    let backend = Arc::new(InMemoryBackend::new());
    let client = ClientBuilder::new()
        .backend(backend.clone())
        .build()
        .expect("client wiring is complete");

    // (B) サインアップ -> メール確認（ダッシュボード相当）-> サインイン
    let sessions = client.session_manager();
    sessions
        .sign_up("demo@example.com", "secret")
        .await
        .expect("sign-up");
    println!("sign up successful, check your email to verify your account");
    backend.confirm_email("demo@example.com").await;
    sessions
        .sign_in("demo@example.com", "secret")
        .await
        .expect("sign-in");
    let session = sessions.current_session().await.expect("session present");
    println!("signed in as {}", session.email());

    // (C) リストと購読を開き、pump ループを起動
    let sync = client.open_sync().await.expect("initial load");
    let (snapshot_tx, snapshot_rx) = mpsc::channel(4);
    let pump = tokio::spawn(sync_loop(sync, snapshot_rx));

    // (D) タスクを作る：効果は echo 経由でだけローカルに現れる
    let email = session.email().to_string();
    client
        .create_task(NewTask::new("Write the demo", "walk the full flow", &email))
        .await
        .expect("create");
    let with_image = client
        .create_task_with_attachment(
            NewTask::new("Attach a picture", "image goes to storage", &email),
            Some(AttachmentSource::new("cat.png", &b"\x89PNG demo bytes"[..])),
        )
        .await
        .expect("create with attachment");
    sleep(Duration::from_millis(50)).await; // echo が届くのを待つ
    print_snapshot(&snapshot_tx, "after create").await;

    // (E) 編集と削除も同じく echo 駆動
    client
        .update_task(with_image.id, TaskPatch::description("picture attached"))
        .await;
    sleep(Duration::from_millis(50)).await;
    print_snapshot(&snapshot_tx, "after update").await;

    client.delete_task(with_image.id).await;
    sleep(Duration::from_millis(50)).await;
    print_snapshot(&snapshot_tx, "after delete").await;

    // (F) 片付け：スナップショット口を閉じるとループが購読を解放して終わる
    drop(snapshot_tx);
    if timeout(Duration::from_secs(1), pump).await.is_err() {
        eprintln!("sync loop did not stop in time");
    }

    sessions.sign_out().await;
    println!("signed out");
}
