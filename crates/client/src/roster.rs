//! Remote participants as seen by one client.

use rustc_hash::FxHashMap;
use tandem_primitives::{Operation, Selection};
use tandem_proto::{ParticipantId, ParticipantInfo};

use crate::color::{ParticipantColor, hue_from_name};
use crate::config::ColorConfig;

/// Another participant in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteParticipant {
	/// Server-assigned identifier.
	pub id: ParticipantId,
	/// Display name, once known.
	pub name: Option<String>,
	/// Colour derived from the name, or from the id while unnamed.
	pub color: ParticipantColor,
	/// Selection in local document coordinates.
	pub selection: Option<Selection>,
}

/// Every remote participant in one document.
#[derive(Debug, Clone, Default)]
pub struct Roster {
	participants: FxHashMap<ParticipantId, RemoteParticipant>,
	colors: ColorConfig,
}

impl Roster {
	/// Creates an empty roster painting participants with `colors`.
	pub fn new(colors: ColorConfig) -> Self {
		Self {
			participants: FxHashMap::default(),
			colors,
		}
	}

	/// Returns the participant with `id`.
	pub fn get(&self, id: ParticipantId) -> Option<&RemoteParticipant> {
		self.participants.get(&id)
	}

	/// Returns the participant with `id`, creating an unnamed entry if needed.
	pub fn get_or_insert(&mut self, id: ParticipantId) -> &mut RemoteParticipant {
		let colors = &self.colors;
		self.participants.entry(id).or_insert_with(|| RemoteParticipant {
			id,
			name: None,
			color: ParticipantColor::from_hue(hue_from_name(&id.to_string()), colors),
			selection: None,
		})
	}

	/// Adds a participant from a join snapshot or announcement.
	pub fn insert(&mut self, info: ParticipantInfo) -> &mut RemoteParticipant {
		let colors = self.colors.clone();
		let participant = self.get_or_insert(info.id);
		if let Some(name) = info.name {
			participant.color = ParticipantColor::for_name(&name, &colors);
			participant.name = Some(name);
		}
		participant.selection = info.selection;
		participant
	}

	/// Renames a participant and re-derives its colour.
	///
	/// Returns false if the name did not change.
	pub fn set_name(&mut self, id: ParticipantId, name: String) -> bool {
		let colors = self.colors.clone();
		let participant = self.get_or_insert(id);
		if participant.name.as_deref() == Some(name.as_str()) {
			return false;
		}
		participant.color = ParticipantColor::for_name(&name, &colors);
		participant.name = Some(name);
		true
	}

	/// Removes a participant.
	pub fn remove(&mut self, id: ParticipantId) -> Option<RemoteParticipant> {
		self.participants.remove(&id)
	}

	/// Moves every displayed selection through a change to the local document.
	pub fn transform_selections(&mut self, op: &Operation) {
		for participant in self.participants.values_mut() {
			if let Some(selection) = participant.selection.as_mut() {
				*selection = selection.transform(op);
			}
		}
	}

	/// Iterates over all participants in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = &RemoteParticipant> {
		self.participants.values()
	}

	/// Number of remote participants.
	pub fn len(&self) -> usize {
		self.participants.len()
	}

	/// Returns true if nobody else is in the document.
	pub fn is_empty(&self) -> bool {
		self.participants.is_empty()
	}
}
