use super::*;

#[test]
fn session_appends_turns_in_order() {
    let mut session = Session::new();
    session.push_user("Wo bekomme ich Essen?");
    session.push_bot("Bei der Tafel.");
    session.push_user("Und Rechtsberatung?");

    let turns = session.turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].message, "Wo bekomme ich Essen?");
    assert_eq!(turns[1].role, Role::Bot);
    assert_eq!(turns[2].role, Role::User);
}

#[test]
fn new_session_is_empty() {
    assert!(Session::new().turns().is_empty());
}
