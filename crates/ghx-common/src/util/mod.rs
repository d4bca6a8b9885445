pub mod var_util;
