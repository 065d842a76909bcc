use std::collections::BTreeSet;

use common::SerdeFormat;

use super::*;
use crate::math::Ellipse;

fn span_tuples(footprint: &Footprint) -> Vec<(i32, i32, i32)> {
    footprint
        .spans()
        .iter()
        .map(|s| (s.y(), s.x0(), s.x1()))
        .collect()
}

fn assert_area_consistent(footprint: &Footprint) {
    let sum: usize = footprint.spans().iter().map(|s| s.width() as usize).sum();
    assert_eq!(footprint.area(), sum);
    assert_eq!(footprint.pixels().count(), sum);
}

fn two_row_footprint(factory: &FootprintFactory) -> Footprint {
    factory
        .from_spans([Span::new(0, 2, 5), Span::new(1, 2, 5), Span::new(1, 7, 9)])
        .unwrap()
}

// =============================================================================
// Construction and ids
// =============================================================================

#[test]
fn test_empty_footprint() {
    let factory = FootprintFactory::new();
    let footprint = factory.empty();
    assert!(footprint.is_empty());
    assert!(footprint.is_normalized());
    assert_eq!(footprint.area(), 0);
    assert!(footprint.bbox().is_empty());
    assert_eq!(footprint.region(), None);
}

#[test]
fn test_ids_are_unique_and_increasing() {
    let factory = FootprintFactory::new();
    let a = factory.empty();
    let b = factory.empty();
    assert!(b.id() > a.id());
    assert_eq!(factory.minted(), 2);
}

#[test]
fn test_clone_gets_new_id() {
    let factory = FootprintFactory::new();
    let original = two_row_footprint(&factory);
    let copy = original.clone();
    assert_ne!(copy.id(), original.id());
    assert_eq!(copy.spans(), original.spans());
    assert_eq!(copy.area(), original.area());
}

#[test]
fn test_factory_clones_share_counter() {
    let factory = FootprintFactory::new();
    let other = factory.clone();
    let ids: BTreeSet<_> = (0..10)
        .map(|i| {
            let minter = if i % 2 == 0 { &factory } else { &other };
            minter.empty().id()
        })
        .collect();
    assert_eq!(ids.len(), 10);
}

#[test]
fn test_from_box() {
    let factory = FootprintFactory::new();
    let footprint = factory.from_box(Box2I::new(-1, 2, 3, 4)).unwrap();
    assert_eq!(span_tuples(&footprint), vec![(3, -1, 2), (4, -1, 2)]);
    assert_eq!(footprint.area(), 8);
    assert!(footprint.is_normalized());

    let err = factory.from_box(Box2I::empty()).unwrap_err();
    assert!(matches!(err, Error::EmptyBox));
}

#[test]
fn test_circle() {
    let factory = FootprintFactory::new();
    let footprint = factory.circle(Point2I::new(5, 5), 2.0).unwrap();
    assert_eq!(
        span_tuples(&footprint),
        vec![(3, 5, 5), (4, 4, 6), (5, 3, 7), (6, 4, 6), (7, 5, 5)]
    );
    assert_eq!(footprint.area(), 13);
    assert_eq!(footprint.bbox(), Box2I::new(3, 7, 3, 7));
}

#[test]
fn test_circle_rejects_bad_radius() {
    let factory = FootprintFactory::new();
    for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = factory.circle(Point2I::ZERO, radius).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Geometry);
    }
}

#[test]
fn test_ellipse_axis_aligned() {
    let factory = FootprintFactory::new();
    let ellipse = Ellipse::new(glam::DVec2::new(0.0, 0.0), 3.5, 1.5, 0.0);
    let footprint = factory.ellipse(&ellipse).unwrap();
    // |x| <= 3.5 on the centre row, |x| <= 2.61 one row away.
    assert_eq!(
        span_tuples(&footprint),
        vec![(-1, -2, 2), (0, -3, 3), (1, -2, 2)]
    );
    assert_area_consistent(&footprint);
}

#[test]
fn test_ellipse_rotated_is_symmetric() {
    let factory = FootprintFactory::new();
    let ellipse = Ellipse::new(glam::DVec2::new(10.0, 10.0), 5.0, 2.0, 0.6);
    let footprint = factory.ellipse(&ellipse).unwrap();
    assert!(footprint.area() > 0);
    for p in footprint.pixels() {
        let mirrored = Point2I::new(20 - p.x, 20 - p.y);
        assert!(footprint.contains(mirrored), "missing mirror of {p}");
    }
}

#[test]
fn test_ellipse_rejects_bad_axes() {
    let factory = FootprintFactory::new();
    let ellipse = Ellipse::new(glam::DVec2::ZERO, 0.0, 1.0, 0.0);
    assert!(matches!(
        factory.ellipse(&ellipse),
        Err(Error::NonPositiveAxes { .. })
    ));
}

// =============================================================================
// Span bookkeeping
// =============================================================================

#[test]
fn test_scenario_two_rows() {
    let factory = FootprintFactory::new();
    let mut footprint = two_row_footprint(&factory);
    assert_eq!(footprint.area(), 11);
    assert_eq!(footprint.bbox(), Box2I::new(2, 9, 0, 1));

    footprint.normalize();
    assert_eq!(span_tuples(&footprint), vec![(0, 2, 5), (1, 2, 5), (1, 7, 9)]);
    assert_eq!(footprint.area(), 11);
    assert_eq!(footprint.bbox(), Box2I::new(2, 9, 0, 1));
}

#[test]
fn test_add_span_returns_stored_span() {
    let factory = FootprintFactory::new();
    let mut footprint = factory.empty();
    let stored = *footprint.add_span(4, 1, 3).unwrap();
    assert_eq!(stored, Span::new(4, 1, 3));

    let shifted = *footprint
        .push_span_shifted(Span::new(0, 0, 1), 10, 5)
        .unwrap();
    assert_eq!(shifted, Span::new(5, 10, 11));
    assert_eq!(footprint.bbox(), Box2I::new(1, 11, 4, 5));
    assert_eq!(footprint.area(), 5);
}

#[test]
fn test_add_inverted_span_leaves_footprint_unchanged() {
    let factory = FootprintFactory::new();
    let mut footprint = two_row_footprint(&factory);
    let err = footprint.add_span(3, 5, 1).unwrap_err();
    assert!(matches!(err, Error::InvertedSpan { y: 3, x0: 5, x1: 1 }));
    assert_eq!(footprint.spans().len(), 3);
    assert_eq!(footprint.area(), 11);
    assert_eq!(footprint.bbox(), Box2I::new(2, 9, 0, 1));
}

#[test]
fn test_normalized_flag_tracks_append_order() {
    let factory = FootprintFactory::new();
    let mut footprint = factory.empty();
    footprint.add_span(0, 0, 2).unwrap();
    assert!(footprint.is_normalized());
    footprint.add_span(0, 4, 5).unwrap();
    assert!(footprint.is_normalized());
    // Touches the previous span, so it would have to be merged.
    footprint.add_span(0, 6, 7).unwrap();
    assert!(!footprint.is_normalized());
    footprint.normalize();
    assert!(footprint.is_normalized());
    footprint.add_span(-1, 0, 0).unwrap();
    assert!(!footprint.is_normalized());
}

#[test]
fn test_normalize_merges_and_is_idempotent() {
    let factory = FootprintFactory::new();
    let mut footprint = factory
        .from_spans([
            Span::new(2, 0, 3),
            Span::new(0, 5, 8),
            Span::new(2, 2, 6),
            Span::new(0, 0, 4),
            Span::new(2, 0, 1),
        ])
        .unwrap();
    assert_eq!(footprint.area(), 4 + 4 + 5 + 5 + 2);

    footprint.normalize();
    let once = span_tuples(&footprint);
    assert_eq!(once, vec![(0, 0, 8), (2, 0, 6)]);
    assert_eq!(footprint.area(), 16);

    footprint.normalize();
    assert_eq!(span_tuples(&footprint), once);
    assert_area_consistent(&footprint);
}

#[test]
fn test_shift_moves_spans_not_peaks() {
    let factory = FootprintFactory::new();
    let mut footprint = two_row_footprint(&factory);
    footprint.add_peak(3, 0, 10.0);
    footprint.shift(5, -2);

    assert_eq!(footprint.bbox(), Box2I::new(7, 14, -2, -1));
    assert_eq!(footprint.spans()[0], Span::new(-2, 7, 10));
    assert_eq!(footprint.peaks()[0].position(), Point2I::new(3, 0));

    footprint.shift_peaks(5, -2);
    assert_eq!(footprint.peaks()[0].position(), Point2I::new(8, -2));
}

#[test]
fn test_clip_to() {
    let factory = FootprintFactory::new();
    let mut footprint = two_row_footprint(&factory);
    footprint.add_peak(8, 1, 1.0);

    let clip = Box2I::new(4, 8, 1, 3);
    footprint.clip_to(clip);
    assert_eq!(span_tuples(&footprint), vec![(1, 4, 5), (1, 7, 8)]);
    assert_eq!(footprint.area(), 4);
    assert!(clip.contains_box(&footprint.bbox()));
    assert_eq!(footprint.peaks().len(), 1);
}

#[test]
fn test_clip_to_disjoint_box_empties() {
    let factory = FootprintFactory::new();
    let mut footprint = two_row_footprint(&factory);
    footprint.clip_to(Box2I::new(100, 101, 100, 101));
    assert!(footprint.is_empty());
    assert_eq!(footprint.area(), 0);
    assert!(footprint.bbox().is_empty());
}

#[test]
fn test_clip_to_region() {
    let factory = FootprintFactory::new();
    let mut footprint = factory
        .circle(Point2I::new(0, 0), 3.0)
        .unwrap()
        .with_region(Box2I::new(0, 10, 0, 10));
    footprint.clip_to_region();
    assert_eq!(footprint.bbox(), Box2I::new(0, 3, 0, 3));
    assert_area_consistent(&footprint);
}

#[test]
fn test_contains_normalized_and_not_agree() {
    let factory = FootprintFactory::new();
    let unsorted = factory
        .from_spans([Span::new(3, 0, 2), Span::new(1, 5, 9), Span::new(1, 0, 1)])
        .unwrap();
    assert!(!unsorted.is_normalized());
    let mut sorted = unsorted.clone();
    sorted.normalize();

    for y in 0..5 {
        for x in -1..11 {
            let p = Point2I::new(x, y);
            assert_eq!(unsorted.contains(p), sorted.contains(p), "at {p}");
        }
    }
    assert!(sorted.contains(Point2I::new(7, 1)));
    assert!(!sorted.contains(Point2I::new(3, 1)));
}

// =============================================================================
// Mask intersection
// =============================================================================

#[test]
fn test_intersect_mask_splits_spans() {
    let factory = FootprintFactory::new();
    let mut footprint = factory.from_box(Box2I::new(0, 5, 0, 1)).unwrap();

    let mut mask: Image<u16> = Image::new_default(Box2I::new(0, 4, 0, 1));
    for x in [0, 1, 3, 4] {
        mask.set(x, 0, 0b10).unwrap();
    }
    mask.set(2, 1, 0b01).unwrap();

    footprint.intersect_mask(&mask, 0b10);
    // Column 5 lies outside the mask.
    assert_eq!(span_tuples(&footprint), vec![(0, 0, 1), (0, 3, 4)]);
    assert_eq!(footprint.area(), 4);
    assert_eq!(footprint.bbox(), Box2I::new(0, 4, 0, 0));
    assert!(footprint.is_normalized());
}

// =============================================================================
// Rasterization
// =============================================================================

#[test]
fn test_insert_into_image() -> anyhow::Result<()> {
    let factory = FootprintFactory::new();
    let footprint = two_row_footprint(&factory);
    let mut image: Image<i32> = Image::new_default(Box2I::new(0, 9, 0, 1));

    footprint.insert_into_image(&mut image, 7, None)?;
    let row1 = image.row_run(1, 0, 9)?;
    assert_eq!(row1, &[0, 0, 7, 7, 7, 7, 0, 7, 7, 7]);
    let count = image.pixels().iter().filter(|&&v| v == 7).count();
    assert_eq!(count, footprint.area());
    Ok(())
}

#[test]
fn test_insert_into_image_out_of_bounds_writes_nothing() {
    let factory = FootprintFactory::new();
    let footprint = two_row_footprint(&factory);
    let extent = Box2I::new(0, 8, 0, 1);
    let mut image: Image<u32> = Image::new_default(extent);

    let err = footprint.insert_into_image(&mut image, 1, None).unwrap_err();
    match err {
        Error::OutOfBounds { x, y, extent: e } => {
            assert_eq!((x, y), (9, 1));
            assert_eq!(e, extent);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(image.pixels().iter().all(|&v| v == 0));
}

#[test]
fn test_insert_into_image_with_region_clips() -> anyhow::Result<()> {
    let factory = FootprintFactory::new();
    let footprint = two_row_footprint(&factory);
    let mut image: Image<u8> = Image::new_default(Box2I::new(0, 8, 0, 1));

    footprint.insert_into_image(&mut image, 3, Some(Box2I::new(0, 100, 1, 1)))?;
    assert_eq!(image.row_run(0, 0, 8)?, &[0; 9]);
    assert_eq!(image.row_run(1, 0, 8)?, &[0, 0, 3, 3, 3, 3, 0, 3, 3]);
    Ok(())
}

#[test]
fn test_insert_into_image_id_out_of_range() {
    let factory = FootprintFactory::new();
    let footprint = two_row_footprint(&factory);
    let mut image: Image<u8> = Image::new_default(Box2I::new(0, 9, 0, 1));
    let err = footprint.insert_into_image(&mut image, 300, None).unwrap_err();
    assert!(matches!(err, Error::IdOutOfRange { id: 300 }));
}

#[test]
fn test_insert_ids_collects_old_ids() -> anyhow::Result<()> {
    let factory = FootprintFactory::new();
    let first = factory.from_box(Box2I::new(0, 3, 0, 0))?;
    let second = factory.from_box(Box2I::new(2, 5, 0, 0))?;
    let mut image: Image<u32> = Image::new_default(Box2I::new(0, 5, 0, 0));

    first.insert_into_image(&mut image, 0x10, None)?;

    let mut old_ids = BTreeSet::new();
    second.insert_ids_into_image(
        &mut image,
        0x02,
        IdOverwrite {
            overwrite_id: false,
            id_mask: 0,
            old_ids: Some(&mut old_ids),
        },
        None,
    )?;

    assert_eq!(old_ids, BTreeSet::from([0x10]));
    assert_eq!(image.pixels(), &[0x10, 0x10, 0x12, 0x12, 0x02, 0x02]);
    Ok(())
}

#[test]
fn test_insert_ids_partial_overwrite() -> anyhow::Result<()> {
    let factory = FootprintFactory::new();
    let footprint = factory.from_box(Box2I::new(0, 1, 0, 0))?;
    let mut image = Image::from_vec(Box2I::new(0, 2, 0, 0), vec![0xF3u16, 0x01, 0xF3])?;

    footprint.insert_ids_into_image(
        &mut image,
        0x04,
        IdOverwrite {
            overwrite_id: true,
            id_mask: 0x0F,
            old_ids: None,
        },
        None,
    )?;
    // Low nibble replaced, high bits kept; the last pixel is outside the footprint.
    assert_eq!(image.pixels(), &[0xF4, 0x04, 0xF3]);
    Ok(())
}

#[test]
fn test_insert_ids_rejects_id_outside_mask() -> anyhow::Result<()> {
    let factory = FootprintFactory::new();
    let footprint = factory.from_box(Box2I::new(0, 1, 0, 0))?;
    let mut image = Image::from_vec(Box2I::new(0, 1, 0, 0), vec![0xF0u16, 0xF0])?;

    let err = footprint
        .insert_ids_into_image(
            &mut image,
            0x103,
            IdOverwrite {
                overwrite_id: true,
                id_mask: 0x0F,
                old_ids: None,
            },
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::IdOutsideMask {
            id: 0x103,
            id_mask: 0x0F
        }
    ));
    assert_eq!(err.kind(), crate::ErrorKind::Bounds);
    // Nothing written.
    assert_eq!(image.pixels(), &[0xF0, 0xF0]);
    Ok(())
}

#[test]
fn test_add_full_range_span() -> anyhow::Result<()> {
    let factory = FootprintFactory::new();
    let mut footprint = factory.empty();
    footprint.add_span(0, i32::MIN, i32::MAX)?;
    assert_eq!(footprint.area(), 1usize << 32);
    Ok(())
}

// =============================================================================
// Records
// =============================================================================

#[test]
fn test_record_round_trip_all_formats() -> anyhow::Result<()> {
    let factory = FootprintFactory::new();
    let mut footprint = factory
        .from_spans([Span::new(1, 7, 9), Span::new(0, 2, 5)])?
        .with_region(Box2I::new(0, 20, 0, 20));
    footprint.add_peak(8, 1, 3.5);
    footprint.add_peak(3, 0, -1.25);

    for format in SerdeFormat::all_formats_for_testing() {
        let bytes = footprint.to_bytes(format)?;
        let restored = factory.footprint_from_bytes(&bytes, format)?;
        assert_eq!(restored.spans(), footprint.spans(), "{format:?}");
        assert_eq!(restored.peaks(), footprint.peaks(), "{format:?}");
        assert_eq!(restored.region(), footprint.region());
        assert_eq!(restored.is_normalized(), footprint.is_normalized());
        assert_eq!(restored.area(), footprint.area());
        assert_ne!(restored.id(), footprint.id());
    }
    Ok(())
}

#[test]
fn test_record_claiming_normalized_is_checked() {
    let factory = FootprintFactory::new();
    let record = FootprintRecord {
        spans: vec![Span::new(1, 0, 1), Span::new(0, 0, 1)],
        peaks: Vec::new(),
        region: None,
        normalized: true,
    };
    let err = factory.from_record(record).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::InconsistentState);
}

#[test]
fn test_record_rejects_inverted_span() {
    let factory = FootprintFactory::new();
    let record = FootprintRecord {
        spans: vec![Span::new(0, 4, 1)],
        peaks: Vec::new(),
        region: None,
        normalized: false,
    };
    assert!(matches!(
        factory.from_record(record),
        Err(Error::InvertedSpan { .. })
    ));
}

// =============================================================================
// Randomized invariants
// =============================================================================

fn random_footprint(factory: &FootprintFactory, rng: &mut impl rand::Rng) -> Footprint {
    let mut footprint = factory.empty();
    for _ in 0..rng.random_range(1..40) {
        let y = rng.random_range(-8..8);
        let x0 = rng.random_range(-20..20);
        let x1 = x0 + rng.random_range(0..6);
        footprint.add_span(y, x0, x1).unwrap();
    }
    footprint
}

#[test]
fn test_random_normalize_preserves_pixels() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let factory = FootprintFactory::new();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..50 {
        let raw = random_footprint(&factory, &mut rng);
        assert_area_consistent(&raw);
        let pixels: BTreeSet<_> = raw.pixels().map(|p| (p.x, p.y)).collect();

        let mut normalized = raw.clone();
        normalized.normalize();
        assert_area_consistent(&normalized);
        assert_eq!(normalized.area(), pixels.len());
        assert_eq!(normalized.bbox(), raw.bbox());

        for pair in normalized.spans().windows(2) {
            assert!(pair[1].follows(&pair[0]), "{} then {}", pair[0], pair[1]);
        }
        for y in -9..9 {
            for x in -21..27 {
                let p = Point2I::new(x, y);
                assert_eq!(normalized.contains(p), pixels.contains(&(x, y)));
                assert_eq!(raw.contains(p), normalized.contains(p));
            }
        }

        let clip = Box2I::new(-5, 5, -3, 3);
        let mut clipped = normalized.clone();
        clipped.clip_to(clip);
        assert!(clip.contains_box(&clipped.bbox()));
        assert_area_consistent(&clipped);
    }
}
