//! [`ServerAdapter`] that queues protocol messages on a channel.

use tandem_primitives::{Operation, Selection};
use tandem_proto::{ClientMessage, DocumentId, Revision};
use tokio::sync::mpsc;

use crate::adapter::ServerAdapter;
use crate::error::{ClientError, Result};

/// Turns outbound calls into [`ClientMessage`]s for one document.
///
/// Whoever owns the receiving end writes the messages to the connection.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
	document: DocumentId,
	tx: mpsc::UnboundedSender<ClientMessage>,
}

impl ChannelTransport {
	/// Creates a transport sending messages about `document` into `tx`.
	pub fn new(document: DocumentId, tx: mpsc::UnboundedSender<ClientMessage>) -> Self {
		Self { document, tx }
	}

	/// Creates a transport together with the receiving end of its queue.
	pub fn channel(document: DocumentId) -> (Self, mpsc::UnboundedReceiver<ClientMessage>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self::new(document, tx), rx)
	}

	/// Document this transport speaks for.
	pub fn document(&self) -> &DocumentId {
		&self.document
	}

	/// Queues an arbitrary message.
	pub fn send(&self, msg: ClientMessage) -> Result<()> {
		self.tx.send(msg).map_err(|_| ClientError::Closed)
	}
}

impl ServerAdapter for ChannelTransport {
	fn send_operation(&mut self, revision: Revision, operation: &Operation, selection: Option<&Selection>) -> Result<()> {
		self.send(ClientMessage::Operation {
			document: self.document.clone(),
			revision,
			operation: operation.clone(),
			selection: selection.cloned(),
		})
	}

	fn send_selection(&mut self, selection: Option<&Selection>) -> Result<()> {
		self.send(ClientMessage::Selection {
			document: self.document.clone(),
			selection: selection.cloned(),
		})
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn messages_are_queued_for_document() {
		let (mut transport, mut rx) = ChannelTransport::channel(DocumentId::from("doc"));
		let op = Operation::builder().insert("a").build();

		transport.send_operation(Revision(2), &op, Some(&Selection::cursor(1))).unwrap();
		transport.send_selection(None).unwrap();

		assert_eq!(
			rx.try_recv().unwrap(),
			ClientMessage::Operation {
				document: "doc".into(),
				revision: Revision(2),
				operation: op,
				selection: Some(Selection::cursor(1)),
			}
		);
		assert_eq!(
			rx.try_recv().unwrap(),
			ClientMessage::Selection {
				document: "doc".into(),
				selection: None,
			}
		);
	}

	#[test]
	fn closed_channel_is_reported() {
		let (mut transport, rx) = ChannelTransport::channel(DocumentId::from("doc"));
		drop(rx);
		assert!(matches!(transport.send_selection(None), Err(ClientError::Closed)));
	}
}
