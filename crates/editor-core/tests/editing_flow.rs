use std::path::PathBuf;

use slidecast_common::EditorDefaults;
use slidecast_editor_core::{EditorSession, Snapshot};
use slidecast_project_model::{Animation, ElementKind, LoadedProject, Point};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-project")
        .join("project.json")
}

fn open_fixture() -> EditorSession {
    let loaded = LoadedProject::load(fixture_path()).expect("fixture project should load");
    EditorSession::from_project_file(&loaded.file, EditorDefaults::default())
        .expect("fixture project should open")
}

#[test]
fn fixture_opens_with_legacy_and_uuid_page_ids() {
    let session = open_fixture();
    let pages = session.project().pages();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].id.as_str(), "1709370900000");
    assert_eq!(pages[1].elements[1].animation, Animation::SlideInDown);
    assert!(matches!(pages[1].elements[0].kind, ElementKind::Image(_)));
    assert_eq!(session.bounds().width, 450.0);
}

#[test]
fn gestures_undo_and_redo_round_trip() {
    let mut session = open_fixture();
    let initial = Snapshot::capture(session.project().pages()).unwrap();

    // drag the invitation text down, then rotate it from its handle
    session.pointer_down(Point::new(200.0, 150.0)).unwrap().unwrap();
    session.pointer_move(Point::new(200.0, 190.0));
    session.pointer_move(Point::new(200.0, 250.0));
    session.pointer_up().unwrap();

    let frame = session.project().current_page().elements[0].frame;
    assert_eq!(frame.y, 200.0);

    // rotate handle sits 24px above the top edge centre
    let handle = Point::new(frame.x + frame.width / 2.0, frame.y - 24.0);
    session.pointer_down(handle).unwrap().unwrap();
    session.pointer_move(Point::new(frame.right() + 40.0, frame.center().y));
    session.pointer_up().unwrap();
    assert!(session.project().current_page().elements[0].frame.rotation > 0.0);

    assert_eq!(session.history().len(), 3);
    let edited = Snapshot::capture(session.project().pages()).unwrap();

    assert!(session.undo().unwrap());
    assert!(session.undo().unwrap());
    assert_eq!(Snapshot::capture(session.project().pages()).unwrap(), initial);

    assert!(session.redo().unwrap());
    assert!(session.redo().unwrap());
    assert_eq!(Snapshot::capture(session.project().pages()).unwrap(), edited);
}

#[test]
fn editing_after_undo_drops_redo_branch() {
    let mut session = open_fixture();
    session.add_text_element().unwrap();
    session.add_text_element().unwrap();
    session.undo().unwrap();
    assert!(session.history().can_redo());

    session.set_page_duration(0, 4.0).unwrap();
    assert!(!session.history().can_redo());
    assert!(!session.redo().unwrap());
}

#[test]
fn drag_is_clamped_to_canvas() {
    let mut session = open_fixture();
    session.pointer_down(Point::new(200.0, 150.0)).unwrap().unwrap();
    session.pointer_move(Point::new(-5000.0, 9000.0));
    session.pointer_up().unwrap();

    let frame = session.project().current_page().elements[0].frame;
    assert_eq!(frame.x, 0.0);
    assert_eq!(frame.y, 800.0 - frame.height);
}
