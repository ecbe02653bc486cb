use super::TableRepository;
use crate::models::Destination;

pub type DestinationRepository = TableRepository<Destination>;
