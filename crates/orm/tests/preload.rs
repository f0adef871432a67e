//! Preload engine tests against the in-memory executor.
//!
//! The fake executor records every statement and bind list, so these tests
//! pin down the query-count bounds and NULL/unmatched-key behavior as well as
//! the final entity state.

use std::any::Any;

use serde_json::{json, Value};

use trellis_orm::fake::{FakeExecutor, FakeRow};
use trellis_orm::{
    bind, downcast_batch, ident, unknown_relation, DatabaseRow, DatabaseRowExt, Model, OrmError,
    OrmResult, Preload, PreloadConfig, Preloader, Relatable, RelationDescriptor,
};

#[derive(Debug, Clone, PartialEq)]
struct Customer {
    id: i64,
    name: String,
    orders: Vec<Order>,
}

impl Model for Customer {
    fn table_name() -> &'static str {
        "customers"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "name"]
    }

    fn from_row(row: &dyn DatabaseRow) -> OrmResult<Self> {
        Ok(Customer {
            id: row.get("id")?,
            name: row.get("name")?,
            orders: Vec::new(),
        })
    }
}

impl Relatable for Customer {
    fn relation(&self, name: &str) -> OrmResult<RelationDescriptor> {
        match name {
            "orders" => Ok(RelationDescriptor::to_many::<Order>("orders", "customer_id")),
            _ => Err(unknown_relation("Customer", name)),
        }
    }

    fn key_value(&self, name: &str) -> OrmResult<Value> {
        match name {
            "orders" => Ok(json!(self.id)),
            _ => Err(unknown_relation("Customer", name)),
        }
    }

    fn match_value(&self, column: &str) -> OrmResult<Value> {
        match column {
            "id" => Ok(json!(self.id)),
            _ => Err(OrmError::ColumnNotFound(column.to_string())),
        }
    }

    fn attach(&mut self, name: &str, batch: Vec<Box<dyn Relatable>>) -> OrmResult<()> {
        match name {
            "orders" => {
                self.orders = downcast_batch(name, batch)?;
                Ok(())
            }
            _ => Err(unknown_relation("Customer", name)),
        }
    }

    fn loaded_mut(&mut self, name: &str) -> OrmResult<Vec<&mut dyn Relatable>> {
        match name {
            "orders" => Ok(self
                .orders
                .iter_mut()
                .map(|order| order as &mut dyn Relatable)
                .collect()),
            _ => Err(unknown_relation("Customer", name)),
        }
    }

    fn clone_boxed(&self) -> Box<dyn Relatable> {
        Box::new(self.clone())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Order {
    id: i64,
    customer_id: i64,
    shipping_address_id: Option<i64>,
    customer: Option<Customer>,
    shipping_address: Option<Address>,
}

impl Model for Order {
    fn table_name() -> &'static str {
        "orders"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "customer_id", "shipping_address_id"]
    }

    fn from_row(row: &dyn DatabaseRow) -> OrmResult<Self> {
        Ok(Order {
            id: row.get("id")?,
            customer_id: row.get("customer_id")?,
            shipping_address_id: row.try_get("shipping_address_id")?,
            customer: None,
            shipping_address: None,
        })
    }
}

impl Relatable for Order {
    fn relation(&self, name: &str) -> OrmResult<RelationDescriptor> {
        match name {
            "customer" => Ok(RelationDescriptor::to_one::<Customer>("customers", "id")),
            "shipping_address" => {
                Ok(RelationDescriptor::to_one::<Address>("addresses", "id"))
            }
            _ => Err(unknown_relation("Order", name)),
        }
    }

    fn key_value(&self, name: &str) -> OrmResult<Value> {
        match name {
            "customer" => Ok(json!(self.customer_id)),
            "shipping_address" => Ok(self
                .shipping_address_id
                .map(Value::from)
                .unwrap_or(Value::Null)),
            _ => Err(unknown_relation("Order", name)),
        }
    }

    fn match_value(&self, column: &str) -> OrmResult<Value> {
        match column {
            "id" => Ok(json!(self.id)),
            "customer_id" => Ok(json!(self.customer_id)),
            _ => Err(OrmError::ColumnNotFound(column.to_string())),
        }
    }

    fn attach(&mut self, name: &str, batch: Vec<Box<dyn Relatable>>) -> OrmResult<()> {
        match name {
            "customer" => {
                self.customer = downcast_batch(name, batch)?.into_iter().next();
                Ok(())
            }
            "shipping_address" => {
                self.shipping_address = downcast_batch(name, batch)?.into_iter().next();
                Ok(())
            }
            _ => Err(unknown_relation("Order", name)),
        }
    }

    fn loaded_mut(&mut self, name: &str) -> OrmResult<Vec<&mut dyn Relatable>> {
        match name {
            "customer" => Ok(self
                .customer
                .as_mut()
                .map(|customer| vec![customer as &mut dyn Relatable])
                .unwrap_or_default()),
            "shipping_address" => Ok(self
                .shipping_address
                .as_mut()
                .map(|address| vec![address as &mut dyn Relatable])
                .unwrap_or_default()),
            _ => Err(unknown_relation("Order", name)),
        }
    }

    fn clone_boxed(&self) -> Box<dyn Relatable> {
        Box::new(self.clone())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Address {
    id: i64,
    city: String,
}

impl Model for Address {
    fn table_name() -> &'static str {
        "addresses"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "city"]
    }

    fn from_row(row: &dyn DatabaseRow) -> OrmResult<Self> {
        Ok(Address {
            id: row.get("id")?,
            city: row.get("city")?,
        })
    }
}

impl Relatable for Address {
    fn relation(&self, name: &str) -> OrmResult<RelationDescriptor> {
        Err(unknown_relation("Address", name))
    }

    fn key_value(&self, name: &str) -> OrmResult<Value> {
        Err(unknown_relation("Address", name))
    }

    fn match_value(&self, column: &str) -> OrmResult<Value> {
        match column {
            "id" => Ok(json!(self.id)),
            _ => Err(OrmError::ColumnNotFound(column.to_string())),
        }
    }

    fn attach(&mut self, name: &str, _batch: Vec<Box<dyn Relatable>>) -> OrmResult<()> {
        Err(unknown_relation("Address", name))
    }

    fn loaded_mut(&mut self, name: &str) -> OrmResult<Vec<&mut dyn Relatable>> {
        Err(unknown_relation("Address", name))
    }

    fn clone_boxed(&self) -> Box<dyn Relatable> {
        Box::new(self.clone())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

fn customer(id: i64, name: &str) -> Customer {
    Customer {
        id,
        name: name.to_string(),
        orders: Vec::new(),
    }
}

fn order(id: i64, customer_id: i64, shipping_address_id: Option<i64>) -> Order {
    Order {
        id,
        customer_id,
        shipping_address_id,
        customer: None,
        shipping_address: None,
    }
}

fn customer_row(id: i64, name: &str) -> FakeRow {
    FakeRow::new(vec![("id", json!(id)), ("name", json!(name))])
}

fn order_row(id: i64, customer_id: i64, shipping_address_id: Option<i64>) -> FakeRow {
    FakeRow::new(vec![
        ("id", json!(id)),
        ("customer_id", json!(customer_id)),
        ("shipping_address_id", json!(shipping_address_id)),
    ])
}

fn address_row(id: i64, city: &str) -> FakeRow {
    FakeRow::new(vec![("id", json!(id)), ("city", json!(city))])
}

#[tokio::test]
async fn to_many_groups_rows_and_unmatched_parents_stay_empty() {
    let db = FakeExecutor::new().with_table(
        "orders",
        "customer_id",
        vec![
            order_row(10, 1, None),
            order_row(11, 1, None),
            order_row(12, 2, None),
        ],
    );
    let mut customers = vec![customer(1, "ada"), customer(2, "grace"), customer(3, "joan")];

    Preloader::new()
        .load(&db, &mut customers, &[Preload::new("orders")])
        .await
        .unwrap();

    assert_eq!(db.query_count(), 1);
    let (sql, params) = &db.calls()[0];
    assert_eq!(
        sql,
        r#"SELECT "id", "customer_id", "shipping_address_id" FROM "orders" WHERE "customer_id" IN ($1, $2, $3)"#
    );
    assert_eq!(params, &vec![json!(1), json!(2), json!(3)]);

    assert_eq!(
        customers[0].orders.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![10, 11]
    );
    assert_eq!(
        customers[1].orders.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![12]
    );
    assert!(customers[2].orders.is_empty());
}

#[tokio::test]
async fn query_count_depends_on_unique_keys_not_parent_count() {
    let db = FakeExecutor::new().with_table(
        "customers",
        "id",
        vec![
            customer_row(1, "ada"),
            customer_row(2, "grace"),
            customer_row(3, "joan"),
        ],
    );
    let mut orders: Vec<Order> = (0..40)
        .map(|i| order(100 + i, (i % 3) + 1, None))
        .collect();

    Preloader::new()
        .load(&db, &mut orders, &[Preload::new("customer")])
        .await
        .unwrap();

    assert_eq!(db.query_count(), 1);
    let (_, params) = &db.calls()[0];
    assert_eq!(params, &vec![json!(1), json!(2), json!(3)]);
    assert!(orders
        .iter()
        .all(|o| o.customer.as_ref().map(|c| c.id) == Some(o.customer_id)));
}

#[tokio::test]
async fn key_sets_larger_than_the_bind_limit_are_chunked() {
    let db = FakeExecutor::new().with_table(
        "customers",
        "id",
        (1..=7).map(|id| customer_row(id, "c")).collect(),
    );
    let mut orders: Vec<Order> = (1..=7).map(|id| order(100 + id, id, None)).collect();

    let preloader = Preloader::with_config(PreloadConfig {
        max_bind_params: 3,
        ..Default::default()
    });
    preloader
        .load(&db, &mut orders, &[Preload::new("customer")])
        .await
        .unwrap();

    // ceil(7 / 3) queries, each within the bind limit
    assert_eq!(db.query_count(), 3);
    let sizes: Vec<usize> = db.calls().iter().map(|(_, params)| params.len()).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert!(orders.iter().all(|o| o.customer.is_some()));
}

#[tokio::test]
async fn null_keys_are_never_bound_and_stay_unset() {
    let db = FakeExecutor::new().with_table(
        "addresses",
        "id",
        vec![address_row(50, "paris"), address_row(51, "london")],
    );
    let mut orders = vec![
        order(1, 1, Some(50)),
        order(2, 1, None),
        order(3, 2, Some(51)),
        order(4, 2, None),
    ];

    Preloader::new()
        .load(&db, &mut orders, &[Preload::new("shipping_address")])
        .await
        .unwrap();

    assert_eq!(db.query_count(), 1);
    let (_, params) = &db.calls()[0];
    assert_eq!(params, &vec![json!(50), json!(51)]);
    assert!(!params.contains(&Value::Null));

    assert_eq!(orders[0].shipping_address.as_ref().unwrap().city, "paris");
    assert!(orders[1].shipping_address.is_none());
    assert_eq!(orders[2].shipping_address.as_ref().unwrap().city, "london");
    assert!(orders[3].shipping_address.is_none());
}

#[tokio::test]
async fn all_null_keys_issue_no_query() {
    let db = FakeExecutor::new().with_table("addresses", "id", vec![]);
    let mut orders = vec![order(1, 1, None), order(2, 2, None)];

    Preloader::new()
        .load(&db, &mut orders, &[Preload::new("shipping_address")])
        .await
        .unwrap();

    assert_eq!(db.query_count(), 0);
    assert!(orders.iter().all(|o| o.shipping_address.is_none()));
}

#[tokio::test]
async fn nested_path_issues_one_query_per_segment() {
    let db = FakeExecutor::new()
        .with_table(
            "orders",
            "customer_id",
            vec![
                order_row(10, 1, Some(50)),
                order_row(11, 1, None),
                order_row(12, 2, Some(51)),
            ],
        )
        .with_table(
            "addresses",
            "id",
            vec![address_row(50, "paris"), address_row(51, "london")],
        );
    let mut customers = vec![customer(1, "ada"), customer(2, "grace")];

    Preloader::new()
        .load(
            &db,
            &mut customers,
            &[Preload::new("orders.shipping_address")],
        )
        .await
        .unwrap();

    let calls = db.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.contains(r#"FROM "orders""#));
    assert!(calls[1].0.contains(r#"FROM "addresses""#));
    assert_eq!(calls[1].1, vec![json!(50), json!(51)]);

    let first_order = &customers[0].orders[0];
    assert_eq!(first_order.shipping_address.as_ref().unwrap().city, "paris");
    assert!(customers[0].orders[1].shipping_address.is_none());
    assert_eq!(
        customers[1].orders[0].shipping_address.as_ref().unwrap().city,
        "london"
    );
}

#[tokio::test]
async fn to_one_parents_sharing_a_key_get_owned_copies() {
    let db = FakeExecutor::new().with_table("addresses", "id", vec![address_row(50, "paris")]);
    let mut orders = vec![order(1, 1, Some(50)), order(2, 2, Some(50))];

    Preloader::new()
        .load(&db, &mut orders, &[Preload::new("shipping_address")])
        .await
        .unwrap();

    assert_eq!(db.query_count(), 1);
    orders[0].shipping_address.as_mut().unwrap().city = "lyon".to_string();
    assert_eq!(orders[1].shipping_address.as_ref().unwrap().city, "paris");
}

#[tokio::test]
async fn preloading_twice_yields_the_same_state() {
    let db = FakeExecutor::new()
        .with_table(
            "orders",
            "customer_id",
            vec![order_row(10, 1, Some(50)), order_row(12, 2, Some(51))],
        )
        .with_table(
            "addresses",
            "id",
            vec![address_row(50, "paris"), address_row(51, "london")],
        );
    let preloads = [Preload::new("orders.shipping_address")];
    let mut customers = vec![customer(1, "ada"), customer(2, "grace")];

    Preloader::new()
        .load(&db, &mut customers, &preloads)
        .await
        .unwrap();
    let after_first = customers.clone();

    Preloader::new()
        .load(&db, &mut customers, &preloads)
        .await
        .unwrap();

    assert_eq!(customers, after_first);
    assert_eq!(db.query_count(), 4);
}

#[tokio::test]
async fn refinements_apply_to_the_final_segment() {
    let db = FakeExecutor::new().with_table(
        "orders",
        "customer_id",
        vec![order_row(10, 1, None), order_row(11, 1, None)],
    );
    let mut customers = vec![customer(1, "ada")];

    Preloader::new()
        .load(
            &db,
            &mut customers,
            &[Preload::new("orders")
                .where_expr(ident("shipping_address_id").is_not_null())
                .order_by(vec![ident("id").desc()])],
        )
        .await
        .unwrap();

    let (sql, _) = &db.calls()[0];
    assert_eq!(
        sql,
        r#"SELECT "id", "customer_id", "shipping_address_id" FROM "orders" WHERE "customer_id" IN ($1) AND "shipping_address_id" IS NOT NULL ORDER BY "id" DESC"#
    );
}

#[tokio::test]
async fn extra_where_binds_come_after_the_key_list() {
    let db = FakeExecutor::new().with_table(
        "orders",
        "customer_id",
        vec![order_row(10, 1, None)],
    );
    let mut customers = vec![customer(1, "ada")];

    Preloader::new()
        .load(
            &db,
            &mut customers,
            &[Preload::new("orders").where_expr(ident("id").greater_than(bind(5i64)))],
        )
        .await
        .unwrap();

    let (sql, params) = &db.calls()[0];
    assert_eq!(
        sql,
        r#"SELECT "id", "customer_id", "shipping_address_id" FROM "orders" WHERE "customer_id" IN ($1) AND "id" > $2"#
    );
    assert_eq!(params, &vec![json!(1), json!(5)]);
}

#[tokio::test]
async fn unknown_relation_name_is_an_error() {
    let db = FakeExecutor::new();
    let mut customers = vec![customer(1, "ada")];

    let result = Preloader::new()
        .load(&db, &mut customers, &[Preload::new("bogus")])
        .await;

    assert!(matches!(result, Err(OrmError::Relationship(_))));
    assert_eq!(db.query_count(), 0);
}

#[tokio::test]
async fn empty_parent_set_is_a_no_op() {
    let db = FakeExecutor::new();
    let mut customers: Vec<Customer> = Vec::new();

    Preloader::new()
        .load(&db, &mut customers, &[Preload::new("orders")])
        .await
        .unwrap();

    assert_eq!(db.query_count(), 0);
}
