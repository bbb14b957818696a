pub mod auto_reply;
