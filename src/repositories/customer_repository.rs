use super::TableRepository;
use crate::models::Customer;

pub type CustomerRepository = TableRepository<Customer>;
