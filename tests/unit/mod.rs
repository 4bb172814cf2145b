mod session_bootstrap;
