use crate::rtree::Rectangle;

/// 内置的命名区域（近似的经纬度范围）
const REGIONS: &[(&str, Rectangle)] = &[
    ("united states", Rectangle::new(-125.0, 24.0, -66.0, 50.0)),
    ("usa", Rectangle::new(-125.0, 24.0, -66.0, 50.0)),
    ("canada", Rectangle::new(-141.0, 41.0, -52.0, 84.0)),
    ("mexico", Rectangle::new(-118.0, 14.0, -97.0, 33.0)),
    ("china", Rectangle::new(73.0, 18.0, 135.0, 54.0)),
    ("russia", Rectangle::new(19.0, 41.0, 180.0, 82.0)),
    ("germany", Rectangle::new(5.0, 47.0, 16.0, 55.0)),
    ("brazil", Rectangle::new(-74.0, -34.0, -34.0, 6.0)),
    ("world", Rectangle::new(-180.0, -90.0, 180.0, 90.0)),
];

/// 按名称查找区域，忽略大小写和首尾空白
pub fn lookup_region(name: &str) -> Option<Rectangle> {
    let name = name.trim().to_lowercase();
    REGIONS
        .iter()
        .find(|(region, _)| *region == name)
        .map(|(_, bounds)| *bounds)
}

/// 所有内置区域的名称
pub fn region_names() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(name, _)| *name)
}

/// 解析 `minx,miny,maxx,maxy` 形式的矩形
pub fn parse_bbox(text: &str) -> Result<Rectangle, String> {
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| format!("Invalid bbox '{}': {}", text, e))?;

    match values[..] {
        [min_x, min_y, max_x, max_y] => Ok(Rectangle::new(min_x, min_y, max_x, max_y)),
        _ => Err(format!(
            "Invalid bbox '{}': expected 4 values (minx,miny,maxx,maxy), found {}",
            text,
            values.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_region() {
        let usa = lookup_region("usa").unwrap();
        assert_eq!(usa, Rectangle::new(-125.0, 24.0, -66.0, 50.0));
        assert_eq!(lookup_region("  United States "), Some(usa));
        assert_eq!(
            lookup_region("WORLD"),
            Some(Rectangle::new(-180.0, -90.0, 180.0, 90.0))
        );
        assert_eq!(lookup_region("atlantis"), None);
        assert_eq!(lookup_region(""), None);
    }

    #[test]
    fn test_all_regions_are_valid() {
        assert_eq!(region_names().count(), 9);
        for name in region_names() {
            assert!(lookup_region(name).unwrap().is_valid(), "{}", name);
        }
    }

    #[test]
    fn test_parse_bbox() {
        assert_eq!(
            parse_bbox("-125, 24, -66.5, 50").unwrap(),
            Rectangle::new(-125.0, 24.0, -66.5, 50.0)
        );
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("1,2,3,4,5").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
        // 反向矩形按原样返回
        assert!(!parse_bbox("5,5,1,1").unwrap().is_valid());
    }
}
