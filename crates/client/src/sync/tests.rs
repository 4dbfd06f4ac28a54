use pretty_assertions::assert_eq;
use tandem_primitives::{Operation, Range, Selection};
use tandem_proto::Revision;

use super::*;

fn insert_at(len: usize, at: usize, text: &str) -> Operation {
	Operation::builder().retain(at).insert(text).retain(len - at).build()
}

#[test]
fn first_local_edit_is_sent() {
	let mut client = SyncClient::new(Revision(3));
	let op = insert_at(5, 5, " world");

	let send = client.apply_client(op.clone()).unwrap();
	assert_eq!(
		send,
		Some(Outgoing {
			revision: Revision(3),
			operation: op.clone()
		})
	);
	assert_eq!(client.state(), &SyncState::AwaitingConfirm { outstanding: op });
}

#[test]
fn later_local_edits_are_buffered_and_composed() {
	let mut client = SyncClient::new(Revision(0));
	client.apply_client(insert_at(0, 0, "a")).unwrap();

	assert_eq!(client.apply_client(insert_at(1, 1, "b")).unwrap(), None);
	assert!(client.is_buffering());
	assert_eq!(client.apply_client(insert_at(2, 2, "c")).unwrap(), None);

	let SyncState::AwaitingWithBuffer { buffer, .. } = client.state() else {
		panic!("expected buffered state, got {:?}", client.state());
	};
	assert_eq!(buffer, &insert_at(1, 1, "bc"));
}

#[test]
fn ack_sends_buffer_at_new_revision() {
	let mut client = SyncClient::new(Revision(0));
	client.apply_client(insert_at(0, 0, "a")).unwrap();
	client.apply_client(insert_at(1, 1, "b")).unwrap();

	let send = client.server_ack().unwrap();
	assert_eq!(
		send,
		Some(Outgoing {
			revision: Revision(1),
			operation: insert_at(1, 1, "b")
		})
	);
	assert_eq!(client.revision(), Revision(1));

	assert_eq!(client.server_ack().unwrap(), None);
	assert_eq!(client.state(), &SyncState::Synchronized);
	assert_eq!(client.revision(), Revision(2));
}

#[test]
fn unexpected_ack_does_not_advance_revision() {
	let mut client = SyncClient::new(Revision(4));
	assert!(matches!(client.server_ack(), Err(ClientError::UnexpectedAck)));
	assert_eq!(client.revision(), Revision(4));
	assert_eq!(client.state(), &SyncState::Synchronized);
}

#[test]
fn remote_op_while_synchronized_applies_as_is() {
	let mut client = SyncClient::new(Revision(0));
	let op = insert_at(2, 0, "x");
	assert_eq!(client.apply_server(op.clone()).unwrap(), op);
	assert_eq!(client.revision(), Revision(1));
}

#[test]
fn remote_op_is_transformed_past_outstanding() {
	// "ab": local inserts X at 0, remote inserts Y at 2.
	let mut client = SyncClient::new(Revision(0));
	client.apply_client(insert_at(2, 0, "X")).unwrap();

	let apply = client.apply_server(insert_at(2, 2, "Y")).unwrap();
	assert_eq!(apply, insert_at(3, 3, "Y"));
	assert_eq!(apply.apply("Xab").unwrap(), "XabY");
	assert_eq!(
		client.state(),
		&SyncState::AwaitingConfirm {
			outstanding: insert_at(3, 0, "X")
		}
	);
}

#[test]
fn remote_op_is_transformed_past_outstanding_and_buffer() {
	let doc = "0123";
	let mut client = SyncClient::new(Revision(0));
	let outstanding = insert_at(4, 1, "A");
	let buffered = insert_at(5, 5, "B");
	client.apply_client(outstanding.clone()).unwrap();
	client.apply_client(buffered.clone()).unwrap();
	let local = buffered.apply(&outstanding.apply(doc).unwrap()).unwrap();
	assert_eq!(local, "0A123B");

	let remote = insert_at(4, 2, "r");
	let apply = client.apply_server(remote.clone()).unwrap();
	let converged = apply.apply(&local).unwrap();
	assert_eq!(converged, "0A1r23B");

	// The server sees remote first, then our transformed outstanding and buffer.
	let SyncState::AwaitingWithBuffer { outstanding, buffer } = client.state().clone() else {
		panic!("expected buffered state");
	};
	let server = remote.apply(doc).unwrap();
	let server = outstanding.apply(&server).unwrap();
	assert_eq!(buffer.apply(&server).unwrap(), converged);
}

#[test]
fn local_edit_that_does_not_follow_pending_edits_is_rejected() {
	let mut client = SyncClient::new(Revision(0));
	client.apply_client(insert_at(2, 0, "X")).unwrap();
	let awaiting = client.state().clone();
	assert!(matches!(
		client.apply_client(insert_at(2, 0, "Y")),
		Err(ClientError::Operation(OperationError::IncompatibleLengths { target: 3, base: 2 }))
	));
	assert_eq!(client.state(), &awaiting);

	client.apply_client(insert_at(3, 3, "Y")).unwrap();
	let buffered = client.state().clone();
	assert!(client.apply_client(Operation::identity(9)).is_err());
	assert_eq!(client.state(), &buffered);
}

#[test]
fn incompatible_remote_op_leaves_state_untouched() {
	let mut client = SyncClient::new(Revision(2));
	client.apply_client(insert_at(2, 0, "X")).unwrap();
	let before = client.state().clone();

	assert!(client.apply_server(Operation::identity(7)).is_err());
	assert_eq!(client.state(), &before);
	assert_eq!(client.revision(), Revision(2));
}

#[test]
fn reconnect_resends_outstanding_only() {
	let mut client = SyncClient::new(Revision(5));
	assert_eq!(client.server_reconnect(), None);

	let first = insert_at(0, 0, "a");
	client.apply_client(first.clone()).unwrap();
	client.apply_client(insert_at(1, 1, "b")).unwrap();

	let resend = client.server_reconnect();
	assert_eq!(
		resend,
		Some(Outgoing {
			revision: Revision(5),
			operation: first
		})
	);
	assert!(client.is_buffering());
}

#[test]
fn selection_is_transformed_through_pending_state() {
	let mut client = SyncClient::new(Revision(0));
	let remote_sel = Selection::new([Range::new(1, 3)]);
	assert_eq!(client.transform_selection(&remote_sel), remote_sel);

	client.apply_client(insert_at(4, 0, "xx")).unwrap();
	assert_eq!(client.transform_selection(&remote_sel), Selection::new([Range::new(3, 5)]));

	client.apply_client(insert_at(6, 4, "y")).unwrap();
	assert_eq!(client.transform_selection(&remote_sel), Selection::new([Range::new(3, 6)]));
}
