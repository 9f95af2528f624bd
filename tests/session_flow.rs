//! End-to-end flows against the in-memory server: load, navigate, mutate,
//! and check that the session follows the server after every step.

use std::cell::RefCell;
use std::rc::Rc;

use webfm::core::mock::{MockServer, Protocols};
use webfm::core::{DirectorySession, FileManager, Method, UploadFile, UploadProgress};
use webfm::models::{ProtocolMode, StatusKind};

const ORIGIN: &str = "http://mock.local";

fn names(session: &RefCell<DirectorySession>) -> Vec<String> {
    session
        .borrow()
        .items()
        .iter()
        .map(|item| item.name.clone())
        .collect()
}

#[tokio::test]
async fn test_browse_html_index_then_webdav() {
    let server = MockServer::new(Protocols {
        json: false,
        webdav: false,
        html: true,
    });
    server.add_dir("/pub/");
    server.add_dir("/pub/docs/");
    server.add_file("/pub/readme.md", b"# hi".to_vec());
    let fm = FileManager::new(server, ORIGIN);
    let session = RefCell::new(DirectorySession::new(ORIGIN, "/pub/index.html"));

    fm.reload(&session).await;
    assert_eq!(session.borrow().protocol_mode(), Some(ProtocolMode::HtmlIndex));
    assert_eq!(names(&session), vec!["docs", "readme.md"]);
    let readme = session.borrow().items()[1].clone();
    assert_eq!(readme.size, Some(4));
    assert!(!session.borrow().capabilities().is_webdav);

    // Same tree, now served over WebDAV
    fm.transport().set_protocols(Protocols {
        json: false,
        webdav: true,
        html: true,
    });
    assert_eq!(fm.open_dir(&session, "/pub/docs/").await, "/pub/docs/");
    let session_ref = session.borrow();
    assert_eq!(session_ref.protocol_mode(), Some(ProtocolMode::WebDav));
    assert!(session_ref.items().is_empty());
    assert!(session_ref.capabilities().supports_mkcol);
    assert_eq!(session_ref.status().text, "Loaded 0 items");
}

#[tokio::test]
async fn test_full_editing_session() {
    let server = MockServer::new(Protocols::all());
    server.add_dir("/home/");
    server.add_file("/home/todo.txt", b"milk".to_vec());
    let fm = FileManager::new(server, ORIGIN);
    let session = RefCell::new(DirectorySession::new(ORIGIN, "/home/"));
    fm.reload(&session).await;

    fm.new_folder(&session, "projects").await;
    assert_eq!(names(&session), vec!["projects", "todo.txt"]);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let files = vec![
        UploadFile::new("a.txt", b"aaaa".to_vec()),
        UploadFile::new("b.txt", b"bb".to_vec()),
    ];
    let report = fm
        .upload_here(
            &session,
            files,
            Rc::new(move |p: &UploadProgress| sink.borrow_mut().push((p.index, p.count))),
        )
        .await
        .unwrap();
    assert_eq!(report.succeeded, 2);
    assert!(seen.borrow().contains(&(1, 2)));
    assert!(seen.borrow().contains(&(2, 2)));

    {
        let mut s = session.borrow_mut();
        s.toggle_selection("/home/a.txt");
        s.toggle_selection("/home/b.txt");
        assert_eq!(s.cut_selection(), 2);
    }
    fm.open_dir(&session, "/home/projects/").await;
    fm.paste_here(&session).await.unwrap();
    assert_eq!(names(&session), vec!["a.txt", "b.txt"]);
    assert!(session.borrow().clipboard().is_empty());

    fm.rename_entry(&session, "/home/projects/b.txt", "c.txt").await;
    assert_eq!(names(&session), vec!["a.txt", "c.txt"]);
    assert_eq!(fm.transport().file_data("/home/projects/c.txt"), Some(b"bb".to_vec()));

    fm.open_dir(&session, "/home/").await;
    session.borrow_mut().toggle_selection("/home/projects/");
    fm.delete_selected(&session).await.unwrap();
    assert_eq!(names(&session), vec!["todo.txt"]);
    assert!(!fm.transport().exists("/home/projects/c.txt"));
    assert_eq!(session.borrow().status().kind, StatusKind::Success);
}

#[tokio::test]
async fn test_server_going_away_keeps_listing() {
    let server = MockServer::new(Protocols::all());
    server.add_file("/notes.txt", b"x".to_vec());
    let fm = FileManager::new(server, ORIGIN);
    let session = RefCell::new(DirectorySession::new(ORIGIN, "/"));
    fm.reload(&session).await;

    fm.transport().set_offline(true);
    assert!(fm.reload(&session).await.is_none());
    let session = session.borrow();
    assert_eq!(session.items().len(), 1);
    assert_eq!(session.status().kind, StatusKind::Error);
    assert_eq!(fm.transport().count(Method::Delete), 0);
}
