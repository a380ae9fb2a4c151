use sprite_ngin::{Sprite, TileMap, Vector2};

use crate::common::test_utils::{assert_vec_eq, init_logger, surface};

mod common;

/// A 10x10 grid where every cell stores `row * 10 + col`.
fn numbered_grid() -> Vec<Vec<u32>> {
    (0..10)
        .map(|row| (0..10).map(|col| row * 10 + col).collect())
        .collect()
}

fn numbered_map() -> TileMap {
    TileMap::tile_pool((64.0, 64.0))
        .tileset((0..100).map(|i| format!("tile{}", i)))
        .map_data(numbered_grid())
        .build()
}

fn sprite_at(x: f32, y: f32) -> Sprite {
    Sprite::builder().position((x, y)).build()
}

#[test]
fn hit_reports_the_cell_under_the_sprite() {
    init_logger();
    let map = numbered_map();

    assert_eq!(map.hit(&sprite_at(40.0, 40.0)), Some(11));
    assert_eq!(map.hit(&sprite_at(100.0, 70.0)), Some(23));
}

#[test]
fn last_column_and_row_are_inside() {
    init_logger();
    let map = numbered_map();

    assert_eq!(map.hit(&sprite_at(9.0 * 32.0 + 1.0, 40.0)), Some(19));
    assert_eq!(map.hit(&sprite_at(40.0, 9.0 * 32.0 + 31.0)), Some(91));
}

#[test]
fn beyond_the_grid_is_no_tile() {
    init_logger();
    let map = numbered_map();

    assert_eq!(map.hit(&sprite_at(320.0, 40.0)), None);
    assert_eq!(map.hit(&sprite_at(40.0, 320.0)), None);
    assert_eq!(map.hit(&sprite_at(1000.0, 1000.0)), None);
}

#[test]
fn first_column_and_row_never_hit() {
    init_logger();
    let map = numbered_map();

    assert_eq!(map.hit(&sprite_at(10.0, 40.0)), None);
    assert_eq!(map.hit(&sprite_at(40.0, 10.0)), None);
    assert_eq!(map.hit(&sprite_at(0.0, 0.0)), None);
}

#[test]
fn negative_coordinates_are_outside() {
    init_logger();
    let map = numbered_map();

    let mut sprite = sprite_at(-10.0, 40.0);
    assert_eq!(map.hit(&sprite), None);
    sprite.set_velocity((41.0, 0.0));
    assert_eq!(map.hit(&sprite), None);
    sprite.set_velocity((43.0, 0.0));
    assert_eq!(map.hit(&sprite), Some(11));
}

#[test]
fn hit_predicts_the_next_move() {
    init_logger();
    let map = numbered_map();
    let mut sprite = sprite_at(20.0, 40.0);
    assert_eq!(map.hit(&sprite), None);

    sprite.set_velocity((20.0, 0.0));
    assert_eq!(map.hit(&sprite), Some(11));
}

#[test]
fn hit_accounts_for_the_scroll_offset() {
    init_logger();
    let mut map = numbered_map();
    map.set_offset((32.0, 64.0));

    assert_eq!(map.hit(&sprite_at(10.0, 10.0)), Some(21));
}

#[test]
fn hit_uses_the_sprite_position_relative_to_its_parent() {
    init_logger();
    let parent = surface(500.0, 500.0, 400.0, 300.0);
    let map = numbered_map();
    let sprite = Sprite::builder().parent(&parent).position((40.0, 40.0)).build();

    assert_eq!(map.hit(&sprite), Some(11));
}

#[test]
fn hit_index_uses_the_no_tile_sentinel() {
    init_logger();
    let map = numbered_map();

    assert_eq!(map.hit_index(&sprite_at(40.0, 40.0)), 11);
    assert_eq!(map.hit_index(&sprite_at(0.0, 0.0)), TileMap::NO_TILE);
}

#[test]
fn hit_without_map_data_is_no_tile() {
    init_logger();
    let map = TileMap::tile_pool((64.0, 64.0)).tileset(["t0"]).build();

    assert_eq!(map.size(), (0, 0));
    assert_eq!(map.hit(&sprite_at(40.0, 40.0)), None);
}

#[test]
fn size_is_columns_by_rows() {
    init_logger();
    let mut map = numbered_map();
    assert_eq!(map.size(), (10, 10));

    map.set_map_data(vec![vec![0, 0, 0], vec![0, 0, 0]]);
    assert_eq!(map.size(), (3, 2));
    assert_eq!(map.tile_at(2, 1), Some(0));
    assert_eq!(map.tile_at(3, 1), None);
}

#[test]
fn offset_round_trips_with_and_without_parent() {
    init_logger();
    let mut map = numbered_map();
    map.set_offset((12.5, -3.0));
    assert_vec_eq(map.offset(), Vector2::new(12.5, -3.0));

    let parent = surface(100.0, 40.0, 400.0, 300.0);
    map.set_parent(Some(&parent));
    map.set_offset((64.0, 8.0));
    assert_vec_eq(map.offset(), Vector2::new(64.0, 8.0));

    parent.borrow_mut().position = Vector2::new(-20.0, 0.0);
    assert_vec_eq(map.offset(), Vector2::new(64.0, 8.0));
    map.set_offset((1.0, 2.0));
    assert_vec_eq(map.offset(), Vector2::new(1.0, 2.0));
}

#[test]
fn updates_without_data_are_skipped() {
    init_logger();
    let mut map = TileMap::tile_pool((64.0, 64.0)).build();
    map.update();
    map.set_map_data(vec![vec![1, 2]]);

    assert!(map.tileset().is_none());
    assert!(map.node().borrow().rectangles().all(|rect| rect.image.is_none()));

    map.set_tileset(vec!["t0".into(), "t1".into(), "t2".into()]);
    assert!(map.node().borrow().rectangles().all(|rect| rect.image.is_some()));
}
