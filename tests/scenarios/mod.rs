mod concurrency;
mod failure_handling;
mod regeneration;
mod reset;
mod success_chain;
