//! Several clients editing one document through an in-memory relay that
//! orders operations the way a server does.

use std::collections::VecDeque;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tandem_client::{ChannelTransport, ClientConfig, ClientError, EditorClient, HeadlessEditor, SyncState};
use tandem_primitives::{Operation, Selection};
use tandem_proto::{ClientMessage, DocumentId, ParticipantId, Revision, ServerMessage};
use tokio::sync::mpsc::UnboundedReceiver;

struct Peer {
	id: ParticipantId,
	editor: HeadlessEditor,
	client: EditorClient<HeadlessEditor, ChannelTransport>,
	outbox: UnboundedReceiver<ClientMessage>,
	inbox: VecDeque<ServerMessage>,
}

impl Peer {
	fn type_at(&mut self, at: usize, text: &str) {
		let (op, inverse) = self.editor.insert(at, text).unwrap();
		self.client.on_change(op, inverse).unwrap();
	}

	fn delete(&mut self, at: usize, n: usize) {
		let (op, inverse) = self.editor.delete(at, n).unwrap();
		self.client.on_change(op, inverse).unwrap();
	}

	fn len(&self) -> usize {
		self.editor.text().chars().count()
	}
}

/// Accepts operations in arrival order and transforms each past whatever
/// its author had not seen yet.
struct World {
	text: String,
	history: Vec<(ParticipantId, Operation)>,
	peers: Vec<Peer>,
}

impl World {
	fn new(text: &str, peers: usize) -> Self {
		let peers = (0..peers)
			.map(|i| {
				let editor = HeadlessEditor::new(text);
				let (transport, outbox) = ChannelTransport::channel(doc());
				let client = EditorClient::new(Revision(0), Vec::new(), editor.clone(), transport, &ClientConfig::default());
				Peer {
					id: ParticipantId(i as u64 + 1),
					editor,
					client,
					outbox,
					inbox: VecDeque::new(),
				}
			})
			.collect();
		Self {
			text: text.to_owned(),
			history: Vec::new(),
			peers,
		}
	}

	/// Delivers everything peer `i` has sent to the relay.
	fn upload(&mut self, i: usize) {
		while let Ok(msg) = self.peers[i].outbox.try_recv() {
			let author = self.peers[i].id;
			match msg {
				ClientMessage::Operation {
					revision,
					operation,
					selection,
					..
				} => {
					if let Some(operation) = self.accept(author, revision, operation) {
						self.broadcast(
							i,
							ServerMessage::Operation {
								document: doc(),
								participant: author,
								operation,
								selection,
							},
						);
					}
					self.peers[i].inbox.push_back(ServerMessage::Ack { document: doc() });
				}
				ClientMessage::Selection { selection, .. } => self.broadcast(
					i,
					ServerMessage::Selection {
						document: doc(),
						participant: author,
						selection,
					},
				),
				other => panic!("unexpected message {other:?}"),
			}
		}
	}

	/// Drops whatever peer `i` has sent, as a broken connection would.
	fn lose_upload(&mut self, i: usize) -> usize {
		std::iter::from_fn(|| self.peers[i].outbox.try_recv().ok()).count()
	}

	fn accept(&mut self, author: ParticipantId, revision: Revision, op: Operation) -> Option<Operation> {
		let since = &self.history[revision.0 as usize..];
		if since.iter().any(|(who, _)| *who == author) {
			return None;
		}
		let op = since
			.iter()
			.fold(op, |op, (_, seen)| Operation::transform(&op, seen).unwrap().0);
		self.text = op.apply(&self.text).unwrap();
		self.history.push((author, op.clone()));
		Some(op)
	}

	fn broadcast(&mut self, from: usize, msg: ServerMessage) {
		for (i, peer) in self.peers.iter_mut().enumerate() {
			if i != from {
				peer.inbox.push_back(msg.clone());
			}
		}
	}

	/// Hands peer `i` everything the relay has sent it.
	fn download(&mut self, i: usize) {
		let peer = &mut self.peers[i];
		while let Some(msg) = peer.inbox.pop_front() {
			peer.client.handle(msg).unwrap();
		}
	}

	fn settle(&mut self) {
		loop {
			let idle = self.peers.iter().all(|p| p.outbox.is_empty() && p.inbox.is_empty());
			if idle {
				return;
			}
			for i in 0..self.peers.len() {
				self.upload(i);
				self.download(i);
			}
		}
	}

	fn assert_converged(&self) {
		for peer in &self.peers {
			assert_eq!(peer.editor.text(), self.text, "participant {}", peer.id);
			assert_eq!(peer.client.state(), &SyncState::Synchronized);
			assert_eq!(peer.client.revision(), Revision(self.history.len() as u64));
		}
	}
}

fn doc() -> DocumentId {
	DocumentId::from("doc")
}

#[test]
fn single_edit_round_trip() {
	let mut world = World::new("hello", 1);
	world.peers[0].type_at(5, " world");
	world.settle();

	assert_eq!(world.text, "hello world");
	world.assert_converged();
	assert_eq!(world.peers[0].client.revision(), Revision(1));
}

#[test]
fn concurrent_inserts_converge() {
	let mut world = World::new("ab", 2);
	world.peers[0].type_at(0, "X");
	world.peers[1].type_at(2, "Y");

	world.upload(0);
	world.upload(1);
	world.settle();

	assert_eq!(world.text, "XabY");
	world.assert_converged();
}

#[test]
fn concurrent_delete_and_insert_converge() {
	let mut world = World::new("abcdef", 2);
	world.peers[0].delete(1, 4);
	world.peers[1].type_at(3, "XY");
	world.peers[1].type_at(5, "Z");

	world.upload(1);
	world.upload(0);
	world.settle();

	assert_eq!(world.text, "aXYZf");
	world.assert_converged();
}

#[test]
fn lost_operation_is_resent_on_reconnect() {
	let mut world = World::new("ab", 1);
	world.peers[0].type_at(2, "c");
	assert_eq!(world.lose_upload(0), 1);

	world.peers[0].client.server_reconnect().unwrap();
	world.settle();

	assert_eq!(world.text, "abc");
	world.assert_converged();
}

#[test]
fn resent_operation_is_applied_once() {
	let mut world = World::new("ab", 1);
	world.peers[0].type_at(2, "c");
	world.upload(0);
	// The ack is lost with the connection.
	world.peers[0].inbox.clear();

	world.peers[0].client.server_reconnect().unwrap();
	world.settle();

	assert_eq!(world.text, "abc");
	assert_eq!(world.history.len(), 1);
	world.assert_converged();

	let duplicate = world.peers[0].client.handle(ServerMessage::Ack { document: doc() });
	assert!(matches!(duplicate, Err(ClientError::UnexpectedAck)));
	assert_eq!(world.peers[0].client.revision(), Revision(1));
}

#[test]
fn undo_ignores_remote_work() {
	let mut world = World::new("world", 2);
	world.peers[0].type_at(5, "!");
	world.settle();
	world.peers[1].type_at(0, "hello ");
	world.settle();
	assert_eq!(world.text, "hello world!");

	world.peers[0].client.undo().unwrap();
	world.settle();

	assert_eq!(world.text, "hello world");
	world.assert_converged();
}

#[test]
fn remote_selection_tracks_concurrent_edits() {
	let mut world = World::new("abcd", 2);
	world.peers[1].editor.select(Selection::cursor(3));
	world.peers[1].client.on_selection_change().unwrap();
	world.peers[0].type_at(0, "xx");

	world.upload(1);
	world.download(0);
	let seen = world.peers[0].client.roster().get(world.peers[1].id).unwrap();
	assert_eq!(seen.selection, Some(Selection::cursor(5)));

	world.settle();
	world.assert_converged();
}

#[derive(Debug, Clone)]
enum Action {
	Type { peer: usize, at: usize, text: String },
	Delete { peer: usize, at: usize },
	Undo { peer: usize },
	Redo { peer: usize },
	Upload { peer: usize },
	Download { peer: usize },
}

fn arb_action(peers: usize) -> impl Strategy<Value = Action> {
	prop_oneof![
		3 => (0..peers, any::<usize>(), "[ab✓]{1,3}").prop_map(|(peer, at, text)| Action::Type { peer, at, text }),
		2 => (0..peers, any::<usize>()).prop_map(|(peer, at)| Action::Delete { peer, at }),
		1 => (0..peers).prop_map(|peer| Action::Undo { peer }),
		1 => (0..peers).prop_map(|peer| Action::Redo { peer }),
		2 => (0..peers).prop_map(|peer| Action::Upload { peer }),
		2 => (0..peers).prop_map(|peer| Action::Download { peer }),
	]
}

proptest! {
	#[test]
	fn prop_random_sessions_converge(
		text in "[a-z]{0,8}",
		actions in prop::collection::vec(arb_action(3), 0..40),
	) {
		let mut world = World::new(&text, 3);
		for action in actions {
			match action {
				Action::Type { peer, at, text } => {
					let len = world.peers[peer].len();
					world.peers[peer].type_at(at % (len + 1), &text);
				}
				Action::Delete { peer, at } => {
					let len = world.peers[peer].len();
					if len > 0 {
						world.peers[peer].delete(at % len, 1);
					}
				}
				Action::Undo { peer } => world.peers[peer].client.undo().unwrap(),
				Action::Redo { peer } => world.peers[peer].client.redo().unwrap(),
				Action::Upload { peer } => world.upload(peer),
				Action::Download { peer } => world.download(peer),
			}
		}
		world.settle();
		world.assert_converged();
	}
}
