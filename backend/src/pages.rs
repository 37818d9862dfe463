//! Minimal HTML shells for the sign-in and registration pages. Styling belongs to the frontend;
//! these exist so the gated routes serve something to anonymous visitors.

pub const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
  <h1>Sign in</h1>
  <form id="auth-form">
    <label>Email <input name="email" type="email" required></label>
    <label>Password <input name="password" type="password" required></label>
    <button type="submit">Sign in</button>
  </form>
  <p id="error" role="alert"></p>
  <p>No account yet? <a href="/register">Create one</a></p>
  <script>
    document.getElementById("auth-form").addEventListener("submit", async (e) => {
      e.preventDefault();
      const body = Object.fromEntries(new FormData(e.target));
      const res = await fetch("/login", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(body),
      });
      if (res.ok) { window.location.assign("/dashboard"); return; }
      const err = await res.json().catch(() => ({ message: "Sign in failed." }));
      document.getElementById("error").textContent = err.message;
    });
  </script>
</body>
</html>
"#;

pub const REGISTER_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Create Account</title></head>
<body>
  <h1>Create Account</h1>
  <form id="auth-form">
    <label>Full Name <input name="name" type="text" required></label>
    <label>Email <input name="email" type="email" required></label>
    <label>Password <input name="password" type="password" required></label>
    <label>Confirm Password <input name="confirm_password" type="password" required></label>
    <button type="submit">Create Account</button>
  </form>
  <p id="error" role="alert"></p>
  <p>Already have an account? <a href="/login">Sign in</a></p>
  <script>
    document.getElementById("auth-form").addEventListener("submit", async (e) => {
      e.preventDefault();
      const body = Object.fromEntries(new FormData(e.target));
      const res = await fetch("/register", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(body),
      });
      if (res.ok) { window.location.assign("/dashboard"); return; }
      const err = await res.json().catch(() => ({ message: "Registration failed. Please try again." }));
      document.getElementById("error").textContent = err.message;
    });
  </script>
</body>
</html>
"#;
