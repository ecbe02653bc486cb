use super::TableRepository;
use crate::models::Schedule;

pub type ScheduleRepository = TableRepository<Schedule>;
