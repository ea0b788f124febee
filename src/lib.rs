pub mod config {
    pub mod config;
    pub mod fetch_arguments;
}

pub mod error;

pub mod elevator_controller {
    pub mod car;
    pub mod direction;
    pub mod doors;
    pub mod elevator_fsm;
    pub mod orders;
    pub mod recall;
    pub mod state;
}

pub mod distributor {
    pub mod distributor;
    pub mod message;
    pub mod receiver;
    pub mod script;
}

pub mod harness {
    pub mod scenarios;
}
