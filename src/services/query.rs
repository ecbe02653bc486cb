//! Capa de consulta sobre tablas cargadas en memoria
//!
//! Filtra, ordena y pagina una tabla completa. Los predicados se evalúan
//! sobre la forma JSON del registro, así una misma consulta sirve para
//! cualquier entidad.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::Record;
use crate::utils::errors::{bad_request_error, AppResult};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Gte,
    Lte,
    /// Subcadena, sin distinguir mayúsculas
    Like,
    /// El campo es un array que contiene el valor
    Contains,
}

/// Condición sobre un campo del registro
#[derive(Debug, Clone)]
pub struct Predicate {
    /// Nombre del parámetro tal y como llegó en la petición
    pub param: String,
    pub field: String,
    pub op: FilterOperator,
    pub value: Value,
}

impl Predicate {
    pub fn new(
        param: impl Into<String>,
        field: impl Into<String>,
        op: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            param: param.into(),
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        let Some(actual) = row.get(&self.field) else {
            return false;
        };

        match self.op {
            FilterOperator::Eq => values_equal(actual, &self.value),
            FilterOperator::Gte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Like => match (actual.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
            FilterOperator::Contains => actual
                .as_array()
                .map(|items| items.iter().any(|item| values_equal(item, &self.value)))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Interpreta `asc`/`desc`; cualquier otro valor es una petición incorrecta
    pub fn parse(raw: Option<&str>, default: SortOrder) -> AppResult<Self> {
        match raw.map(|s| s.trim().to_lowercase()) {
            None => Ok(default),
            Some(s) if s == "asc" => Ok(SortOrder::Asc),
            Some(s) if s == "desc" => Ok(SortOrder::Desc),
            Some(other) => Err(bad_request_error(&format!(
                "Invalid sort_order '{}', expected 'asc' or 'desc'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn from_params(limit: Option<usize>, offset: Option<usize>) -> AppResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(bad_request_error(&format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }
}

/// Campos por los que se puede ordenar un listado y orden por defecto
#[derive(Debug, Clone, Copy)]
pub struct Sorting {
    pub fields: &'static [&'static str],
    pub default_field: Option<&'static str>,
    pub default_order: SortOrder,
}

impl Sorting {
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self {
            fields,
            default_field: None,
            default_order: SortOrder::Asc,
        }
    }

    pub const fn by_default(self, field: &'static str, order: SortOrder) -> Self {
        Self {
            fields: self.fields,
            default_field: Some(field),
            default_order: order,
        }
    }
}

/// Parámetros comunes de todos los listados
#[derive(Debug, Clone, Copy, Default)]
pub struct ListParams<'a> {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub include_inactive: Option<bool>,
    pub sort_by: Option<&'a str>,
    pub sort_order: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    predicates: Vec<Predicate>,
    sort: Option<(String, SortOrder)>,
    pagination: Pagination,
    include_inactive: bool,
}

impl ListQuery {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Default::default()
        }
    }

    /// Validar paginación y orden de la petición
    pub fn from_params(params: ListParams<'_>, sorting: &Sorting) -> AppResult<Self> {
        let pagination = Pagination::from_params(params.limit, params.offset)?;
        let order = SortOrder::parse(params.sort_order, sorting.default_order)?;

        let mut query = Self::new(pagination).include_inactive(params.include_inactive.unwrap_or(false));

        match params.sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            Some(field) if sorting.fields.contains(&field) => {
                query = query.sort_by(field, order);
            }
            Some(field) => {
                return Err(bad_request_error(&format!(
                    "Cannot sort by '{}', expected one of: {}",
                    field,
                    sorting.fields.join(", ")
                )));
            }
            None => {
                if let Some(field) = sorting.default_field {
                    query = query.sort_by(field, order);
                }
            }
        }

        Ok(query)
    }

    pub fn include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = include;
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Añade el predicado sólo si el parámetro vino en la petición
    pub fn filter_opt<V: Into<Value>>(
        self,
        param: &str,
        field: &str,
        op: FilterOperator,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.filter(Predicate::new(param, field, op, value)),
            None => self,
        }
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    fn filters_applied(&self) -> BTreeMap<String, Value> {
        let mut applied: BTreeMap<String, Value> = self
            .predicates
            .iter()
            .map(|p| (p.param.clone(), p.value.clone()))
            .collect();
        if self.include_inactive {
            applied.insert("include_inactive".to_string(), Value::Bool(true));
        }
        if let Some((field, order)) = &self.sort {
            applied.insert("sort_by".to_string(), Value::String(field.clone()));
            applied.insert("sort_order".to_string(), serde_json::json!(order));
        }
        applied
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationMetadata {
    pub total_count: usize,
    pub filtered_count: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
    pub current_page: usize,
    pub total_pages: usize,
    pub filters_applied: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub metadata: PaginationMetadata,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            metadata: self.metadata,
        }
    }
}

/// Aplicar la consulta a una tabla completa
pub fn run<T: Record>(records: Vec<T>, query: &ListQuery) -> AppResult<Page<T>> {
    let total_count = records.len();

    let mut matched: Vec<(Value, T)> = Vec::new();
    for record in records {
        if !query.include_inactive && !record.is_active() {
            continue;
        }
        let row = serde_json::to_value(&record)?;
        if query.predicates.iter().all(|p| p.matches(&row)) {
            matched.push((row, record));
        }
    }

    if let Some((field, order)) = &query.sort {
        // sort_by es estable: los empates conservan el orden de inserción
        matched.sort_by(|(a, _), (b, _)| {
            let ordering = compare_for_sort(a.get(field), b.get(field));
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    let filtered_count = matched.len();
    let Pagination { limit, offset } = query.pagination;

    let items: Vec<T> = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(_, record)| record)
        .collect();

    Ok(Page {
        items,
        metadata: PaginationMetadata {
            total_count,
            filtered_count,
            limit,
            offset,
            has_more: offset.saturating_add(limit) < filtered_count,
            current_page: (offset / limit).saturating_add(1),
            total_pages: filtered_count.div_ceil(limit),
            filters_applied: query.filters_applied(),
        },
    })
}

/// Quedarse sólo con los campos pedidos; el `id` se conserva siempre
pub fn project_fields(row: Value, fields: &[String]) -> Value {
    match row {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key == "id" || fields.iter().any(|f| f == key))
                .collect(),
        ),
        other => other,
    }
}

/// Separar una lista `a,b,c` de parámetros
pub fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Clone)]
enum Comparable {
    Number(f64),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Text(String),
    Bool(bool),
}

impl Comparable {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Comparable::Number),
            Value::Bool(b) => Some(Comparable::Bool(*b)),
            Value::String(s) => {
                if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                    Some(Comparable::Timestamp(ts.with_timezone(&Utc)))
                } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    Some(Comparable::Date(date))
                } else {
                    Some(Comparable::Text(s.clone()))
                }
            }
            _ => None,
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    let left = Comparable::from_value(a)?;
    let right = Comparable::from_value(b)?;

    match (left, right) {
        (Comparable::Number(x), Comparable::Number(y)) => x.partial_cmp(&y),
        (Comparable::Timestamp(x), Comparable::Timestamp(y)) => Some(x.cmp(&y)),
        (Comparable::Date(x), Comparable::Date(y)) => Some(x.cmp(&y)),
        (Comparable::Timestamp(x), Comparable::Date(y)) => Some(x.date_naive().cmp(&y)),
        (Comparable::Date(x), Comparable::Timestamp(y)) => Some(x.cmp(&y.date_naive())),
        (Comparable::Text(x), Comparable::Text(y)) => Some(x.cmp(&y)),
        (Comparable::Bool(x), Comparable::Bool(y)) => Some(x.cmp(&y)),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.eq_ignore_ascii_case(y),
        _ => compare_values(a, b) == Some(Ordering::Equal) || a == b,
    }
}

/// Los valores ausentes o nulos van primero en orden ascendente
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or_else(|| x.to_string().cmp(&y.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Destination, RecordMeta, RecordStatus};
    use crate::utils::errors::AppError;
    use serde_json::json;

    fn destination(id: u64, name: &str, country: &str, price: f64) -> Destination {
        Destination {
            id,
            name: name.to_string(),
            country: country.to_string(),
            description: None,
            price,
            meta: RecordMeta::new(),
        }
    }

    fn sample() -> Vec<Destination> {
        let mut closed = destination(4, "Bergen", "Norway", 650.0);
        closed.meta.status = RecordStatus::Inactive;

        vec![
            destination(1, "Lisbon", "Portugal", 420.0),
            destination(2, "Porto", "Portugal", 380.0),
            destination(3, "Oslo", "Norway", 900.0),
            closed,
            destination(5, "Faro", "Portugal", 380.0),
        ]
    }

    fn ids(page: &Page<Destination>) -> Vec<u64> {
        page.items.iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_default_excludes_inactive() {
        let page = run(sample(), &ListQuery::default()).unwrap();
        assert_eq!(ids(&page), vec![1, 2, 3, 5]);
        assert_eq!(page.metadata.total_count, 5);
        assert_eq!(page.metadata.filtered_count, 4);

        let page = run(sample(), &ListQuery::default().include_inactive(true)).unwrap();
        assert_eq!(ids(&page), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_predicates() {
        let query = ListQuery::default()
            .filter_opt("country", "country", FilterOperator::Eq, Some("portugal"))
            .filter_opt("max_price", "price", FilterOperator::Lte, Some(400.0))
            .filter_opt::<f64>("min_price", "price", FilterOperator::Gte, None);

        let page = run(sample(), &query).unwrap();
        assert_eq!(ids(&page), vec![2, 5]);
        assert_eq!(page.metadata.filters_applied.len(), 2);
        assert_eq!(page.metadata.filters_applied["max_price"], json!(400.0));
    }

    #[test]
    fn test_like_is_case_insensitive() {
        let query = ListQuery::default().filter(Predicate::new("name", "name", FilterOperator::Like, "OR"));
        let page = run(sample(), &query).unwrap();
        assert_eq!(ids(&page), vec![2]);
    }

    #[test]
    fn test_stable_sort() {
        let query = ListQuery::default().sort_by("price", SortOrder::Asc);
        let page = run(sample(), &query).unwrap();
        // Porto y Faro empatan en precio: se mantiene el orden de inserción
        assert_eq!(ids(&page), vec![2, 5, 1, 3]);

        let query = ListQuery::default().sort_by("price", SortOrder::Desc);
        let page = run(sample(), &query).unwrap();
        assert_eq!(ids(&page), vec![3, 1, 2, 5]);
    }

    #[test]
    fn test_pagination_metadata() {
        let query = ListQuery::new(Pagination::from_params(Some(3), Some(3)).unwrap());
        let page = run(sample(), &query).unwrap();

        assert_eq!(ids(&page), vec![5]);
        assert!(!page.metadata.has_more);
        assert_eq!(page.metadata.current_page, 2);
        assert_eq!(page.metadata.total_pages, 2);

        let query = ListQuery::new(Pagination::from_params(Some(2), None).unwrap());
        let page = run(sample(), &query).unwrap();
        assert!(page.metadata.has_more);
    }

    #[test]
    fn test_huge_offset_yields_empty_page() {
        let query = ListQuery::new(Pagination::from_params(Some(20), Some(usize::MAX)).unwrap());
        let page = run(sample(), &query).unwrap();

        assert!(page.items.is_empty());
        assert!(!page.metadata.has_more);
        assert_eq!(page.metadata.offset, usize::MAX);
    }

    #[test]
    fn test_invalid_params() {
        assert!(matches!(Pagination::from_params(Some(0), None), Err(AppError::BadRequest(_))));
        assert!(matches!(Pagination::from_params(Some(101), None), Err(AppError::BadRequest(_))));
        assert!(matches!(
            SortOrder::parse(Some("sideways"), SortOrder::Asc),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(SortOrder::parse(Some("DESC"), SortOrder::Asc).unwrap(), SortOrder::Desc);
    }

    #[test]
    fn test_from_params() {
        const SORTING: Sorting = Sorting::new(&["name", "price"]).by_default("price", SortOrder::Desc);

        let query = ListQuery::from_params(ListParams::default(), &SORTING).unwrap();
        assert_eq!(ids(&run(sample(), &query).unwrap()), vec![3, 1, 2, 5]);

        let params = ListParams {
            sort_by: Some("name"),
            sort_order: Some("asc"),
            include_inactive: Some(true),
            ..Default::default()
        };
        let query = ListQuery::from_params(params, &SORTING).unwrap();
        assert_eq!(ids(&run(sample(), &query).unwrap()), vec![4, 5, 1, 3, 2]);

        let params = ListParams {
            sort_by: Some("country"),
            ..Default::default()
        };
        assert!(matches!(ListQuery::from_params(params, &SORTING), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_date_against_timestamp() {
        let row = json!({"transaction_date": "2024-03-10T18:30:00Z"});
        let from = Predicate::new("date_from", "transaction_date", FilterOperator::Gte, "2024-03-10");
        let to = Predicate::new("date_to", "transaction_date", FilterOperator::Lte, "2024-03-10");
        assert!(from.matches(&row));
        assert!(to.matches(&row));
    }

    #[test]
    fn test_contains_and_projection() {
        let row = json!({"id": 9, "destination_ids": [1, 4], "role": "guide"});
        assert!(Predicate::new("destination_id", "destination_ids", FilterOperator::Contains, 4).matches(&row));
        assert!(!Predicate::new("destination_id", "destination_ids", FilterOperator::Contains, 2).matches(&row));

        let projected = project_fields(row, &split_csv(Some("role, missing")));
        assert_eq!(projected, json!({"id": 9, "role": "guide"}));
    }
}
