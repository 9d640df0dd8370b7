use crate::rtree::{DataItem, Rectangle};
use geo::{coord, Polygon, Rect};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde_json::json;

/// 将矩形转为 geo::Polygon（无效矩形返回 None）
pub fn rectangle_to_polygon(rect: &Rectangle) -> Option<Polygon<f64>> {
    if !rect.is_valid() {
        return None;
    }
    let rect = Rect::new(
        coord! { x: rect.min_corner.x, y: rect.min_corner.y },
        coord! { x: rect.max_corner.x, y: rect.max_corner.y },
    );
    Some(rect.to_polygon())
}

/// 将一条记录转为 GeoJSON Feature
///
/// 几何为矩形的闭合环，属性为 `id`、`name`、`population`。
/// 无效边界的记录没有几何。
pub fn data_item_to_feature(item: &DataItem) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), json!(item.id));
    properties.insert("name".to_string(), json!(item.name));
    properties.insert("population".to_string(), json!(item.population));

    let geometry = rectangle_to_polygon(&item.bounds)
        .map(|polygon| geojson::Geometry::new(geojson::Value::from(&polygon)));
    let bbox = item.bounds.is_valid().then(|| {
        vec![
            item.bounds.min_corner.x,
            item.bounds.min_corner.y,
            item.bounds.max_corner.x,
            item.bounds.max_corner.y,
        ]
    });

    Feature {
        bbox,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// 将搜索结果转为 GeoJSON FeatureCollection
pub fn items_to_geojson(items: &[DataItem]) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features: items.iter().map(data_item_to_feature).collect(),
        foreign_members: None,
    })
}
