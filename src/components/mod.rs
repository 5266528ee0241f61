pub mod diamond;
