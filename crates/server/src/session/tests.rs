use pretty_assertions::assert_eq;
use tandem_primitives::{Operation, OperationError, Selection};
use tandem_proto::{ParticipantId, ParticipantInfo, Revision, ServerMessage};

use super::*;

const ADA: ParticipantId = ParticipantId(1);
const GRACE: ParticipantId = ParticipantId(2);

fn insert_at(len: usize, at: usize, text: &str) -> Operation {
	Operation::builder().retain(at).insert(text).retain(len - at).build()
}

fn session(text: &str) -> Session {
	let mut session = Session::new("doc".into(), text, None);
	session.join(ADA, Some("ada".into())).unwrap();
	session.join(GRACE, Some("grace".into())).unwrap();
	session
}

fn to(deliveries: &[Delivery], id: ParticipantId) -> Vec<&ServerMessage> {
	deliveries.iter().filter(|d| d.to == id).map(|d| &d.msg).collect()
}

#[test]
fn join_returns_snapshot_and_announces() {
	let mut session = Session::new("doc".into(), "hello", None);
	session.join(ADA, Some("ada".into())).unwrap();
	session.update_selection(ADA, Some(Selection::cursor(2))).unwrap();

	let out = session.join(GRACE, None).unwrap();
	assert_eq!(
		out,
		vec![
			Delivery {
				to: GRACE,
				msg: ServerMessage::Joined {
					document: "doc".into(),
					participant: GRACE,
					revision: Revision(0),
					text: "hello".into(),
					clients: vec![ParticipantInfo {
						id: ADA,
						name: Some("ada".into()),
						selection: Some(Selection::cursor(2)),
					}],
				},
			},
			Delivery {
				to: ADA,
				msg: ServerMessage::ClientJoined {
					document: "doc".into(),
					participant: GRACE,
					name: None,
				},
			},
		]
	);
}

#[test]
fn operation_is_acked_and_broadcast() {
	let mut session = session("hello");
	let op = insert_at(5, 5, " world");
	let out = session
		.receive_operation(ADA, Revision(0), op.clone(), Some(Selection::cursor(11)))
		.unwrap();

	assert_eq!(session.text(), "hello world");
	assert_eq!(session.revision(), Revision(1));
	assert_eq!(to(&out, ADA), vec![&ServerMessage::Ack { document: "doc".into() }]);
	assert_eq!(
		to(&out, GRACE),
		vec![&ServerMessage::Operation {
			document: "doc".into(),
			participant: ADA,
			operation: op,
			selection: Some(Selection::cursor(11)),
		}]
	);
}

#[test]
fn late_operation_is_transformed_past_history() {
	let mut session = session("ab");
	session.receive_operation(ADA, Revision(0), insert_at(2, 0, "X"), None).unwrap();
	let out = session.receive_operation(GRACE, Revision(0), insert_at(2, 2, "Y"), None).unwrap();

	assert_eq!(session.text(), "XabY");
	assert!(matches!(
		to(&out, ADA)[..],
		[ServerMessage::Operation { operation, .. }] if *operation == insert_at(3, 3, "Y")
	));
}

#[test]
fn resent_operation_is_only_acked() {
	let mut session = session("ab");
	let op = insert_at(2, 2, "c");
	session.receive_operation(ADA, Revision(0), op.clone(), None).unwrap();

	let out = session.receive_operation(ADA, Revision(0), op, None).unwrap();
	assert_eq!(
		out,
		vec![Delivery {
			to: ADA,
			msg: ServerMessage::Ack { document: "doc".into() },
		}]
	);
	assert_eq!(session.text(), "abc");
	assert_eq!(session.revision(), Revision(1));
}

#[test]
fn future_revision_is_rejected() {
	let mut session = session("ab");
	let err = session
		.receive_operation(ADA, Revision(3), insert_at(2, 0, "x"), None)
		.unwrap_err();
	assert_eq!(
		err,
		SessionError::InvalidRevision {
			revision: Revision(3),
			oldest: Revision(0),
			latest: Revision(0),
		}
	);
}

#[test]
fn discarded_revision_is_rejected() {
	let mut session = Session::new("doc".into(), "", Some(2));
	session.join(ADA, None).unwrap();
	session.join(GRACE, None).unwrap();
	for (rev, ch) in ["a", "b", "c"].into_iter().enumerate() {
		session.receive_operation(ADA, Revision(rev as u64), insert_at(rev, rev, ch), None).unwrap();
	}
	assert_eq!(session.revision(), Revision(3));

	let err = session.receive_operation(GRACE, Revision(0), insert_at(0, 0, "x"), None);
	assert!(matches!(err, Err(SessionError::InvalidRevision { oldest: Revision(1), .. })));

	session.receive_operation(GRACE, Revision(1), insert_at(1, 0, "x"), None).unwrap();
	assert_eq!(session.text(), "xabc");
}

#[test]
fn mismatched_operation_leaves_document_untouched() {
	let mut session = session("ab");
	let err = session.receive_operation(ADA, Revision(0), Operation::identity(5), None);
	assert!(matches!(err, Err(SessionError::Operation(OperationError::LengthMismatch { .. }))));
	assert_eq!(session.text(), "ab");
	assert_eq!(session.revision(), Revision(0));
}

#[test]
fn strangers_cannot_edit() {
	let mut session = session("ab");
	let stranger = ParticipantId(9);
	assert_eq!(
		session.receive_operation(stranger, Revision(0), insert_at(2, 0, "x"), None),
		Err(SessionError::UnknownParticipant(stranger))
	);
	assert_eq!(
		session.update_selection(stranger, None),
		Err(SessionError::UnknownParticipant(stranger))
	);
}

#[test]
fn names_are_unique_per_session() {
	let mut session = session("");
	assert_eq!(
		session.set_name(GRACE, "ada".into()),
		Err(SessionError::NameTaken("ada".into()))
	);
	assert_eq!(
		session.join(ParticipantId(3), Some("grace".into())),
		Err(SessionError::NameTaken("grace".into()))
	);

	let out = session.set_name(GRACE, "hopper".into()).unwrap();
	assert_eq!(
		out,
		vec![Delivery {
			to: ADA,
			msg: ServerMessage::SetName {
				document: "doc".into(),
				participant: GRACE,
				name: "hopper".into(),
			},
		}]
	);
	// Keeping one's own name is not a conflict.
	assert!(session.set_name(GRACE, "hopper".into()).is_ok());
}

#[test]
fn selection_is_stored_and_forwarded() {
	let mut session = session("abc");
	let out = session.update_selection(GRACE, Some(Selection::single(0, 2))).unwrap();
	assert_eq!(out.len(), 1);
	assert_eq!(out[0].to, ADA);
	assert_eq!(session.participants()[1].selection, Some(Selection::single(0, 2)));
}

#[test]
fn leaving_announces_departure() {
	let mut session = session("");
	let out = session.leave(ADA);
	assert_eq!(
		out,
		vec![Delivery {
			to: GRACE,
			msg: ServerMessage::ClientLeft {
				document: "doc".into(),
				participant: ADA,
			},
		}]
	);
	assert!(session.leave(ADA).is_empty());

	session.leave(GRACE);
	assert!(session.is_empty());
}
