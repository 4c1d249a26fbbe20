/// Tests for using the distance expression inside Diesel queries
///
/// These render queries with `debug_query` against the PostgreSQL backend, so no
/// database connection is needed.

#[cfg(test)]
mod diesel_distance_tests {
    use diesel::debug_query;
    use diesel::pg::Pg;
    use diesel::prelude::*;
    use geosearch::{
        Coordinate, DistanceExpression, GeoCapable, GeoSearchOptions, StaticTable, install,
    };

    diesel::table! {
        stores (id) {
            id -> Int4,
            name -> Text,
            lat -> Float8,
            lng -> Float8,
        }
    }

    fn atlanta_distance() -> DistanceExpression {
        DistanceExpression::build(Coordinate::new(34.0, -84.0), "stores", "lat", "lng", 3963.0)
    }

    #[test]
    fn test_select_renders_bound_formula() {
        let query = stores::table.select((stores::id, atlanta_distance()));
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(
            sql.starts_with("SELECT \"stores\".\"id\", ($1 * ACOS(LEAST(1, COS($2) * COS($3) * COS(RADIANS(\"stores\".\"lat\"))"),
            "unexpected SQL: {}",
            sql
        );
        assert!(sql.contains("SIN(RADIANS(\"stores\".\"lng\"))"));
        assert!(sql.contains("FROM \"stores\""));
        // Radius and the folded origin angles are bound, never interpolated
        assert!(sql.contains("3963.0"));
        assert!(sql.contains(&format!("{:?}", 34.0_f64.to_radians())));
    }

    #[test]
    fn test_filter_within_limit() {
        let query = stores::table
            .select(stores::id)
            .filter(stores::name.ne("closed"))
            .filter(atlanta_distance().within(20.0));
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains("\"stores\".\"name\" != $1"), "unexpected SQL: {}", sql);
        assert!(sql.contains("($2 * ACOS(LEAST(1, COS($3)"), "unexpected SQL: {}", sql);
        // radius, five origin angles, then the limit
        assert!(sql.contains("\"stores\".\"lat\"))))) <= $8"), "unexpected SQL: {}", sql);
        assert!(sql.contains("20.0"));
    }

    #[test]
    fn test_order_by_distance() {
        let query = stores::table
            .select(stores::id)
            .order(atlanta_distance().asc())
            .limit(5);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains("ORDER BY ($1 * ACOS(LEAST(1, "), "unexpected SQL: {}", sql);
        assert!(sql.contains("\"stores\".\"lat\"))))) ASC LIMIT $"));
    }

    #[test]
    fn test_installed_config_drives_diesel_expression() {
        let table = StaticTable::new("stores", ["id", "name", "lat", "lng"]);
        let options = GeoSearchOptions::default().distance_units("kilometers");
        install(&table, &options).unwrap();

        let config = table.geo_config().unwrap();
        let distance =
            DistanceExpression::for_config(Coordinate::new(0.0, 0.0), "stores", config);
        let query = stores::table.select((stores::id, distance));
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains("6378.0"), "unexpected SQL: {}", sql);
    }

    #[test]
    fn test_unusual_identifiers_are_quoted() {
        let distance = DistanceExpression::build(
            Coordinate::new(1.0, 2.0),
            "Store Locations",
            "Lat\"itude",
            "lng",
            3444.0,
        );
        let query = stores::table.select(distance);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains("\"Store Locations\".\"Lat\"\"itude\""), "unexpected SQL: {}", sql);
    }
}
