pub mod preview_worker;
