//! Property tests for document id allocation, encoding stability, and the
//! forward/inverse transform pair.

use emoji_canvas_core::{Document, GestureMode, Vec2, ViewTransform, Viewport};
use proptest::prelude::*;

/// A small op language for building arbitrary documents.
#[derive(Debug, Clone)]
enum Op {
    Add { text: String, x: i32, y: i32, size: i32 },
    Toggle(i32),
    Mark(i32),
    Delete(i32),
    DeselectAll,
    Background(Option<String>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (
            prop_oneof![
                Just(String::new()),
                Just("🔑".to_string()),
                Just("🎈".to_string()),
                Just("🛀🏻".to_string()),
            ],
            -500..500i32,
            -500..500i32,
            1..200i32,
        )
            .prop_map(|(text, x, y, size)| Op::Add { text, x, y, size }),
        (0..40i32).prop_map(Op::Toggle),
        (0..40i32).prop_map(Op::Mark),
        (0..40i32).prop_map(Op::Delete),
        Just(Op::DeselectAll),
        proptest::option::of("[a-z]{1,12}")
            .prop_map(|name| Op::Background(name.map(|n| format!("https://example.com/{n}")))),
    ]
}

fn apply(document: &mut Document, op: Op) {
    match op {
        Op::Add { text, x, y, size } => {
            document.add_item(text, x, y, size);
        }
        Op::Toggle(id) => document.toggle_select(id),
        Op::Mark(id) => document.mark_ready_to_remove(id),
        Op::Delete(id) => document.delete(id),
        Op::DeselectAll => document.deselect_all(),
        Op::Background(reference) => document.set_background(reference),
    }
}

proptest! {
    /// Every add sequence yields unique, strictly increasing ids, no matter
    /// what other operations are interleaved.
    #[test]
    fn ids_unique_and_strictly_increasing(ops in proptest::collection::vec(op_strategy(), 0..60)) {
        let mut document = Document::new();
        let mut last_id = 0;
        for op in ops {
            let added = matches!(op, Op::Add { .. });
            if added {
                if let Op::Add { text, x, y, size } = op {
                    let id = document.add_item(text, x, y, size);
                    prop_assert!(id > last_id);
                    last_id = id;
                }
            } else {
                apply(&mut document, op);
            }
        }
        let mut seen: Vec<i32> = document.items().iter().map(|item| item.id()).collect();
        let ordered = seen.clone();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), document.item_count());
        // z-order is insertion order, so surviving ids stay sorted
        prop_assert!(ordered.windows(2).all(|w| w[0] < w[1]));
    }

    /// Serialize → deserialize → serialize is byte-identical for arbitrary
    /// documents, including residual selection state.
    #[test]
    fn encoding_round_trip_is_stable(ops in proptest::collection::vec(op_strategy(), 0..60)) {
        let mut document = Document::new();
        for op in ops {
            apply(&mut document, op);
        }
        let first = document.to_json_bytes().unwrap();
        let decoded = Document::from_json_bytes(&first).unwrap();
        let second = decoded.to_json_bytes().unwrap();
        prop_assert_eq!(first, second);
    }

    /// The drop mapping is the inverse of the forward position mapping for
    /// any steady/live transform state.
    #[test]
    fn forward_then_inverse_recovers_model_point(
        mx in -2000.0f32..2000.0,
        my in -2000.0f32..2000.0,
        steady_zoom in 0.1f32..8.0,
        live_zoom in 0.25f32..4.0,
        pan_x in -1000.0f32..1000.0,
        pan_y in -1000.0f32..1000.0,
    ) {
        let mut transform = ViewTransform::new();
        transform.pinch(steady_zoom, GestureMode::Canvas);
        transform.release_pinch(GestureMode::Canvas);
        transform.drag(Vec2::new(pan_x, pan_y), GestureMode::Canvas);
        transform.release_drag(GestureMode::Canvas);
        transform.pinch(live_zoom, GestureMode::Canvas);

        let viewport = Viewport::new(1024.0, 768.0);
        let model = Vec2::new(mx, my);
        let screen = transform.position_of(model, viewport, false);
        let recovered = transform.model_point_of(screen, viewport);

        let tolerance = 1e-2 * (1.0 + mx.abs().max(my.abs()));
        prop_assert!((recovered.x - mx).abs() <= tolerance, "{recovered:?} vs {model:?}");
        prop_assert!((recovered.y - my).abs() <= tolerance, "{recovered:?} vs {model:?}");
    }

    /// Two rescales compose to within one rounding unit of the direct product.
    #[test]
    fn rescale_composition_stays_within_one_unit(
        size in 1..400i32,
        f1 in 0.25f32..4.0,
        f2 in 0.25f32..4.0,
    ) {
        let mut document = Document::new();
        let id = document.add_item("🔑", 0, 0, size);
        document.rescale_item(id, f1);
        document.rescale_item(id, f2);
        let stepped = document.item(id).unwrap().size();

        #[allow(clippy::cast_precision_loss)]
        let direct = (size as f32 * f1 * f2).round_ties_even();
        let direct = direct as i32;
        // intermediate rounding may drift, but scaled back up it stays within
        // one rounding unit of the second factor
        let drift = (stepped - direct).abs();
        let bound = f2.abs().ceil() as i32 + 1;
        prop_assert!(drift <= bound, "size {size} f1 {f1} f2 {f2}: {stepped} vs {direct}");
    }
}
