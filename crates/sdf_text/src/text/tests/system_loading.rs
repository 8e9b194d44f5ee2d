//! Asset sharing and completion routing through the text system

use super::{ManualFetcher, RecordingHost};
use crate::assets::{AssetError, AssetKind, FetchCompletion, FileFetcher};
use crate::foundation::logging;
use crate::text::test_fonts::{atlas_png, monospace_fnt};
use crate::text::{NodeState, TextAttributes, TextDefaults, TextError, TextEvent, TextSystem};

const FONT: &str = "fonts/mono.fnt";
const IMAGE: &str = "fonts/mono.png";

fn system() -> (TextSystem, ManualFetcher) {
    logging::init_for_tests();
    let fetcher = ManualFetcher::default();
    let defaults = TextDefaults {
        font_url: FONT.into(),
        ..Default::default()
    };
    (TextSystem::new(Box::new(fetcher.clone()), defaults), fetcher)
}

fn deliver_font(system: &mut TextSystem) -> Vec<TextEvent> {
    let mut events = system.deliver(AssetKind::FontDescriptor, FONT, Ok(monospace_fnt()));
    events.extend(system.deliver(AssetKind::AtlasImage, IMAGE, Ok(atlas_png())));
    events
}

#[test]
fn test_attach_fetches_font_and_derived_image() {
    let (mut system, fetcher) = system();
    let host = RecordingHost::default();
    let node = system.attach(Box::new(host.clone()), &TextAttributes::with_text("hi"));

    assert_eq!(
        *fetcher.issued.borrow(),
        vec![
            (AssetKind::FontDescriptor, FONT.to_string()),
            (AssetKind::AtlasImage, IMAGE.to_string())
        ]
    );
    assert_eq!(system.node(node).unwrap().state(), NodeState::Loading);

    // Font alone is not enough
    let events = system.deliver(AssetKind::FontDescriptor, FONT, Ok(monospace_fnt()));
    assert!(events.is_empty());
    assert_eq!(host.renderable_count(), 0);

    let events = system.deliver(AssetKind::AtlasImage, IMAGE, Ok(atlas_png()));
    assert_eq!(events, vec![TextEvent::Rendered { node }]);
    assert_eq!(host.renderable_count(), 1);
}

#[test]
fn test_removal_then_reuse_without_refetch() {
    let (mut system, fetcher) = system();
    let first_host = RecordingHost::default();
    let first = system.attach(Box::new(first_host.clone()), &TextAttributes::with_text("one"));
    deliver_font(&mut system);

    system.remove(first).unwrap();
    assert_eq!(first_host.renderable_count(), 0);
    assert_eq!(system.library().len(), 2);

    let second_host = RecordingHost::default();
    let second = system.attach(Box::new(second_host.clone()), &TextAttributes::with_text("two"));

    // Cached assets complete synchronously
    assert_eq!(second_host.renderable_count(), 1);
    assert_eq!(system.pump(), vec![TextEvent::Rendered { node: second }]);
    assert_eq!(fetcher.issued_count(), 2);
}

#[test]
fn test_duplicate_in_flight_requests_share_one_fetch() {
    let (mut system, fetcher) = system();
    let a = system.attach(Box::new(RecordingHost::default()), &TextAttributes::with_text("a"));
    let b = system.attach(Box::new(RecordingHost::default()), &TextAttributes::with_text("b"));
    assert_eq!(fetcher.issued_count(), 2);

    let events = deliver_font(&mut system);
    assert_eq!(events.len(), 2);
    assert!(events.contains(&TextEvent::Rendered { node: a }));
    assert!(events.contains(&TextEvent::Rendered { node: b }));
}

#[test]
fn test_failure_reaches_each_waiter_once() {
    let (mut system, _fetcher) = system();
    let a_host = RecordingHost::default();
    let a = system.attach(Box::new(a_host.clone()), &TextAttributes::with_text("a"));
    let b = system.attach(Box::new(RecordingHost::default()), &TextAttributes::with_text("b"));

    let events = system.deliver(AssetKind::FontDescriptor, FONT, Err(AssetError::NotFound(FONT.into())));
    assert_eq!(events.len(), 2);
    for (event, node) in events.iter().zip([a, b]) {
        assert!(matches!(
            event,
            TextEvent::Failed { node: n, error: TextError::FontLoad(_) } if *n == node
        ));
    }

    // The atlas still lands in the cache but nobody is waiting any more
    assert!(system.deliver(AssetKind::AtlasImage, IMAGE, Ok(atlas_png())).is_empty());
    assert_eq!(system.node(a).unwrap().state(), NodeState::Idle);
    assert_eq!(a_host.renderable_count(), 0);
}

#[test]
fn test_failed_font_is_refetched_on_next_update() {
    let (mut system, fetcher) = system();
    let node = system.attach(Box::new(RecordingHost::default()), &TextAttributes::with_text("a"));
    system.deliver(AssetKind::FontDescriptor, FONT, Ok(b"not a font".to_vec()));

    system.update(node, &TextAttributes::with_text("a")).unwrap();
    assert_eq!(fetcher.issued_count(), 3);
}

#[test]
fn test_superseded_load_is_discarded() {
    let (mut system, _fetcher) = system();
    let host = RecordingHost::default();
    let node = system.attach(
        Box::new(host.clone()),
        &TextAttributes {
            text: "slow font".into(),
            fnt: Some("fonts/slow.fnt".into()),
            ..Default::default()
        },
    );

    system.update(node, &TextAttributes::with_text("fast")).unwrap();
    assert_eq!(deliver_font(&mut system), vec![TextEvent::Rendered { node }]);

    let mut events = system.deliver(AssetKind::FontDescriptor, "fonts/slow.fnt", Ok(monospace_fnt()));
    events.extend(system.deliver(AssetKind::AtlasImage, "fonts/slow.png", Ok(atlas_png())));
    assert_eq!(events, vec![TextEvent::Discarded { node }]);

    assert_eq!(host.mesh().unwrap().geometry.quad_count(), 4);
    assert_eq!(host.0.borrow().published, 1);
}

#[test]
fn test_repeated_updates_on_same_font_keep_one_waiter() {
    let (mut system, fetcher) = system();
    let host = RecordingHost::default();
    let node = system.attach(Box::new(host.clone()), &TextAttributes::with_text("v0"));

    for i in 1..=50 {
        system.update(node, &TextAttributes::with_text(format!("v{i}"))).unwrap();
    }
    assert_eq!(system.pending_count(), 1);
    assert_eq!(fetcher.issued_count(), 2);

    assert_eq!(deliver_font(&mut system), vec![TextEvent::Rendered { node }]);
    assert_eq!(system.pending_count(), 0);
    assert_eq!(system.node(node).unwrap().config().unwrap().text, "v50");
    assert_eq!(host.0.borrow().published, 1);
}

#[test]
fn test_superseded_waiters_leave_when_their_font_fails() {
    let (mut system, _fetcher) = system();
    let node = system.attach(
        Box::new(RecordingHost::default()),
        &TextAttributes {
            text: "slow".into(),
            fnt: Some("fonts/slow.fnt".into()),
            ..Default::default()
        },
    );
    system.update(node, &TextAttributes::with_text("fast")).unwrap();
    assert_eq!(system.pending_count(), 2);

    let events = system.deliver(
        AssetKind::FontDescriptor,
        "fonts/slow.fnt",
        Err(AssetError::NotFound("fonts/slow.fnt".into())),
    );
    assert_eq!(events, vec![TextEvent::Discarded { node }]);
    assert_eq!(system.pending_count(), 1);
    assert_eq!(system.node(node).unwrap().state(), NodeState::Loading);
}

#[test]
fn test_pump_drains_fetcher_completions() {
    let (mut system, fetcher) = system();
    let host = RecordingHost::default();
    let node = system.attach(Box::new(host.clone()), &TextAttributes::with_text("pumped"));
    assert!(system.pump().is_empty());

    fetcher.ready.borrow_mut().extend([
        FetchCompletion {
            kind: AssetKind::FontDescriptor,
            url: FONT.into(),
            result: Ok(monospace_fnt()),
        },
        FetchCompletion {
            kind: AssetKind::AtlasImage,
            url: IMAGE.into(),
            result: Ok(atlas_png()),
        },
    ]);
    assert_eq!(system.pump(), vec![TextEvent::Rendered { node }]);
    assert_eq!(host.renderable_count(), 1);
}

#[test]
fn test_file_fetcher_end_to_end() {
    logging::init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("fonts")).unwrap();
    std::fs::write(dir.path().join(FONT), monospace_fnt()).unwrap();
    std::fs::write(dir.path().join(IMAGE), atlas_png()).unwrap();

    let fetcher = FileFetcher::new(vec![dir.path().to_path_buf()]);
    let defaults = TextDefaults {
        font_url: FONT.into(),
        ..Default::default()
    };
    let mut system = TextSystem::new(Box::new(fetcher), defaults);

    let host = RecordingHost::default();
    let node = system.attach(Box::new(host.clone()), &TextAttributes::with_text("from disk"));
    assert_eq!(system.pump(), vec![TextEvent::Rendered { node }]);

    let mesh = host.mesh().unwrap();
    assert_eq!(mesh.geometry.quad_count(), 9);
    assert_eq!(mesh.material.atlas.url(), IMAGE);
}

#[test]
fn test_unknown_node_handles_are_errors() {
    let (mut system, _fetcher) = system();
    let node = system.attach(Box::new(RecordingHost::default()), &TextAttributes::default());
    system.remove(node).unwrap();

    assert_eq!(system.remove(node), Err(TextError::UnknownNode));
    assert_eq!(
        system.update(node, &TextAttributes::default()),
        Err(TextError::UnknownNode)
    );
    assert_eq!(system.node_count(), 0);
}
