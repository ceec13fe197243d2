// tests/flow_test.rs — Integration test: intake flow reachability

use std::sync::Arc;

use decora::flow::{Advance, FlowState, FlowStep};
use decora::infra::config::FlowConfig;
use decora::session::repository::SessionRepository;
use decora::session::store::MemoryKvStore;
use decora::session::{MessageRole, SessionStatus};
use pretty_assertions::assert_eq;

fn repo() -> SessionRepository {
    SessionRepository::new(Arc::new(MemoryKvStore::new()))
}

#[test]
fn test_select_next_next_next_reaches_chat_with_one_session() {
    let repo = repo();
    let mut flow = FlowState::new(FlowConfig::default());

    assert_eq!(flow.step(), FlowStep::RoomSelection);
    flow.select_room("Living Room").unwrap();
    flow.attach_space_image("data:image/jpeg;base64,AAAA".into());
    flow.toggle_inspiration(0);
    flow.toggle_inspiration(3);

    assert!(matches!(
        flow.next(&repo).unwrap(),
        Advance::Step(FlowStep::Inspiration)
    ));
    assert!(matches!(
        flow.next(&repo).unwrap(),
        Advance::Step(FlowStep::Budget)
    ));

    let Advance::ChatReady(session) = flow.next(&repo).unwrap() else {
        panic!("expected the intake to complete");
    };
    assert_eq!(flow.step(), FlowStep::Chat);

    // exactly one session was created, already persisted
    let all = repo.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], session);
    assert_eq!(session.status, SessionStatus::Idle);

    // exactly one synthesized welcome entry
    assert_eq!(session.conversation.len(), 1);
    let welcome = &session.conversation[0];
    assert_eq!(welcome.role, MessageRole::Assistant);
    let text = welcome.content.display_text();
    assert!(text.contains("Living Room"), "room missing: {text}");
    assert!(text.contains("$1,500"), "budget missing: {text}");
    assert!(text.contains("2 inspiration styles"), "count missing: {text}");
}

#[test]
fn test_flow_stays_in_chat_until_new_chat() {
    let repo = repo();
    let mut flow = FlowState::new(FlowConfig::default());
    flow.select_room("Bedroom").unwrap();
    flow.attach_space_image("data:image/png;base64,BB".into());
    flow.next(&repo).unwrap();
    flow.next(&repo).unwrap();
    flow.next(&repo).unwrap();

    // next in chat is a steady no-op; no extra session appears
    assert!(matches!(
        flow.next(&repo).unwrap(),
        Advance::Step(FlowStep::Chat)
    ));
    assert_eq!(repo.all().len(), 1);

    flow.new_chat();
    assert_eq!(flow.step(), FlowStep::RoomSelection);
    // flow-local state is gone, but persisted sessions are untouched
    assert!(flow.space_image().is_none());
    assert_eq!(repo.all().len(), 1);
}

#[test]
fn test_second_pass_creates_a_second_session() {
    let repo = repo();
    let mut flow = FlowState::new(FlowConfig::default());

    for _ in 0..2 {
        flow.new_chat();
        flow.select_room("Kitchen").unwrap();
        flow.attach_space_image("data:image/png;base64,CC".into());
        flow.next(&repo).unwrap();
        flow.next(&repo).unwrap();
        flow.next(&repo).unwrap();
    }

    let all = repo.all();
    assert_eq!(all.len(), 2);
    assert_ne!(all[0].session_id, all[1].session_id);
}

#[test]
fn test_welcome_respects_custom_budget_and_singular_style() {
    let repo = repo();
    let mut flow = FlowState::new(FlowConfig::default());
    flow.select_room("Outdoor Deck").unwrap();
    flow.attach_space_image("data:image/png;base64,DD".into());
    flow.toggle_inspiration(5);
    flow.next(&repo).unwrap();
    flow.next(&repo).unwrap();
    flow.set_budget(7_250);

    let Advance::ChatReady(session) = flow.next(&repo).unwrap() else {
        panic!("expected completion");
    };
    let text = session.conversation[0].content.display_text();
    assert!(text.contains("Outdoor Deck"));
    assert!(text.contains("$7,250"));
    assert!(text.contains("1 inspiration style"));
}
