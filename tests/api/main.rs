mod health_check;
mod in_memory;
mod uploads;
