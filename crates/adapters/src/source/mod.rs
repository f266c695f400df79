pub mod nws_feed;
