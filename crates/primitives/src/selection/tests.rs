use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

#[test]
fn cursor_selection() {
	let sel = Selection::cursor(5);
	assert_eq!(sel.len(), 1);
	assert_eq!(sel.ranges(), &[Range::point(5)]);
	assert!(!sel.something_selected());
}

#[test]
fn something_selected_with_any_non_empty_range() {
	let sel = Selection::new([Range::point(1), Range::new(4, 2)]);
	assert!(sel.something_selected());
}

#[test]
fn ranges_keep_order_and_overlap() {
	let sel = Selection::new([Range::new(10, 15), Range::new(0, 5), Range::new(3, 12)]);
	assert_eq!(sel.ranges(), &[Range::new(10, 15), Range::new(0, 5), Range::new(3, 12)]);
}

#[test]
fn transform_moves_every_range() {
	let sel = Selection::new([Range::point(0), Range::new(2, 4), Range::point(6)]);
	let op = Operation::builder().retain(1).insert("abc").retain(5).build();

	let moved = sel.transform(&op);
	assert_eq!(moved.ranges(), &[Range::point(0), Range::new(5, 7), Range::point(9)]);
}

#[test]
fn transform_empty_selection() {
	let op = Operation::builder().insert("x").build();
	assert!(Selection::default().transform(&op).is_empty());
}

#[test]
fn compose_keeps_newer() {
	let a = Selection::cursor(1);
	let b = Selection::single(2, 3);
	assert_eq!(a.compose(&b), b);
}

#[test]
fn wire_format() {
	let sel = Selection::new([Range::new(1, 4), Range::point(7)]);
	let value = serde_json::to_value(&sel).unwrap();
	assert_eq!(
		value,
		json!({ "ranges": [{ "anchor": 1, "head": 4 }, { "anchor": 7, "head": 7 }] })
	);
	assert_eq!(Selection::from_json(&value).unwrap(), sel);
}

#[test]
fn wire_rejects_negative_offsets() {
	let value = json!({ "ranges": [{ "anchor": -1, "head": 0 }] });
	assert!(Selection::from_json(&value).is_err());
}

#[test]
fn wire_accepts_empty_range_list() {
	let sel = Selection::from_json(&json!({ "ranges": [] })).unwrap();
	assert!(sel.is_empty());
	assert!(!sel.something_selected());
	assert_eq!(sel, Selection::default());
}
