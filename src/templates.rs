//! Starter snippets offered for each supported language.

use serde::Serialize;

use crate::language::Language;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub language: Language,
    pub code: &'static str,
}

pub const CODE_TEMPLATES: &[CodeTemplate] = &[
    CodeTemplate {
        name: "Basic Class",
        description: "A basic Python class with constructor and methods",
        language: Language::Python,
        code: r#"class MyClass:
    def __init__(self, name):
        self.name = name

    def greet(self):
        return f"Hello, {self.name}!"

    def __str__(self):
        return f"MyClass(name='{self.name}')""#,
    },
    CodeTemplate {
        name: "FastAPI Endpoint",
        description: "A basic FastAPI endpoint with request handling",
        language: Language::Python,
        code: r#"from fastapi import FastAPI, HTTPException
from pydantic import BaseModel

app = FastAPI()

class Item(BaseModel):
    name: str
    price: float
    description: str | None = None

@app.post("/items/")
async def create_item(item: Item):
    return item"#,
    },
    CodeTemplate {
        name: "React Component",
        description: "A functional React component with hooks",
        language: Language::Javascript,
        code: r#"import React, { useState, useEffect } from 'react';

const MyComponent = ({ initialValue }) => {
  const [value, setValue] = useState(initialValue);

  useEffect(() => {
    console.log('Component mounted');
  }, []);

  return (
    <div>
      <h1>{value}</h1>
      <button onClick={() => setValue(value + 1)}>
        Increment
      </button>
    </div>
  );
};

export default MyComponent;"#,
    },
    CodeTemplate {
        name: "TypeScript Interface",
        description: "A TypeScript interface with methods",
        language: Language::Typescript,
        code: r#"interface User {
  id: number;
  name: string;
  email: string;
  role: 'admin' | 'user';

  updateProfile(data: Partial<User>): Promise<void>;
  delete(): Promise<void>;
}

class UserImpl implements User {
  constructor(
    public id: number,
    public name: string,
    public email: string,
    public role: 'admin' | 'user'
  ) {}

  async updateProfile(data: Partial<User>): Promise<void> {
    Object.assign(this, data);
  }

  async delete(): Promise<void> {}
}"#,
    },
    CodeTemplate {
        name: "Spring Boot Controller",
        description: "A Spring Boot REST controller",
        language: Language::Java,
        code: r#"@RestController
@RequestMapping("/api")
public class UserController {

    @Autowired
    private UserService userService;

    @GetMapping("/users")
    public List<User> getAllUsers() {
        return userService.findAll();
    }

    @PostMapping("/users")
    public ResponseEntity<User> createUser(@RequestBody User user) {
        return ResponseEntity.ok(userService.save(user));
    }
}"#,
    },
    CodeTemplate {
        name: "Modern C++ Class",
        description: "A modern C++ class using smart pointers",
        language: Language::Cpp,
        code: r#"#include <memory>
#include <string>

class Person {
private:
    std::string name;
    std::unique_ptr<int> age;

public:
    Person(const std::string& n, int a)
        : name(n), age(std::make_unique<int>(a)) {}

    const std::string& getName() const { return name; }
    int getAge() const { return *age; }

    void setAge(int a) { *age = a; }
};"#,
    },
    CodeTemplate {
        name: "ASP.NET Core API",
        description: "An ASP.NET Core API controller",
        language: Language::Csharp,
        code: r#"using Microsoft.AspNetCore.Mvc;

[ApiController]
[Route("api/[controller]")]
public class UsersController : ControllerBase
{
    private readonly IUserService _userService;

    public UsersController(IUserService userService)
    {
        _userService = userService;
    }

    [HttpGet]
    public async Task<ActionResult<IEnumerable<User>>> GetUsers()
    {
        var users = await _userService.GetAllAsync();
        return Ok(users);
    }
}"#,
    },
    CodeTemplate {
        name: "HTTP Handler",
        description: "A Go HTTP handler",
        language: Language::Go,
        code: r#"package main

import (
    "net/http"
)

type Handler struct {
    service *Service
}

func NewHandler(service *Service) *Handler {
    return &Handler{service: service}
}

func (h *Handler) HandleRequest(w http.ResponseWriter, r *http.Request) {
    if r.Method != http.MethodPost {
        http.Error(w, "Method not allowed", http.StatusMethodNotAllowed)
        return
    }

    response, err := h.service.Process(r.Context(), r.Body)
    if err != nil {
        http.Error(w, err.Error(), http.StatusInternalServerError)
        return
    }

    w.Header().Set("Content-Type", "application/json")
    w.Write(response)
}"#,
    },
    CodeTemplate {
        name: "Rust Struct",
        description: "A Rust struct with implementations",
        language: Language::Rust,
        code: r#"#[derive(Debug)]
struct User {
    name: String,
    age: u32,
    email: Option<String>,
}

impl User {
    fn new(name: String, age: u32) -> Self {
        User {
            name,
            age,
            email: None,
        }
    }

    fn set_email(&mut self, email: String) {
        self.email = Some(email);
    }

    fn email(&self) -> Option<&String> {
        self.email.as_ref()
    }
}"#,
    },
    CodeTemplate {
        name: "Rails Model",
        description: "A Ruby on Rails model with validations",
        language: Language::Ruby,
        code: r#"class User < ApplicationRecord
  has_many :posts
  has_one :profile

  validates :email, presence: true,
            format: { with: URI::MailTo::EMAIL_REGEXP },
            uniqueness: true

  before_save :normalize_email

  private

  def normalize_email
    self.email = email.downcase.strip
  end
end"#,
    },
    CodeTemplate {
        name: "Laravel Controller",
        description: "A Laravel controller with resource methods",
        language: Language::Php,
        code: r#"<?php

namespace App\Http\Controllers;

use App\Models\User;
use Illuminate\Http\Request;

class UserController extends Controller
{
    public function index()
    {
        return User::all();
    }

    public function store(Request $request)
    {
        $validated = $request->validate([
            'name' => 'required|string|max:255',
            'email' => 'required|email|unique:users',
        ]);

        return User::create($validated);
    }
}"#,
    },
    CodeTemplate {
        name: "SwiftUI View",
        description: "A SwiftUI view with state management",
        language: Language::Swift,
        code: r#"import SwiftUI

struct ContentView: View {
    @State private var count = 0

    var body: some View {
        VStack {
            Text("Count: \(count)")
                .font(.title)

            Button("Increment") {
                count += 1
            }
        }
        .padding()
    }
}"#,
    },
    CodeTemplate {
        name: "Kotlin Data Class",
        description: "A Kotlin data class with companion object",
        language: Language::Kotlin,
        code: r#"data class User(
    val id: Long,
    val name: String,
    val email: String,
    val role: UserRole
) {
    companion object {
        fun create(name: String, email: String): User {
            return User(
                id = System.currentTimeMillis(),
                name = name,
                email = email,
                role = UserRole.USER
            )
        }
    }
}

enum class UserRole {
    ADMIN, USER
}"#,
    },
    CodeTemplate {
        name: "Scala Case Class",
        description: "A Scala case class with companion object",
        language: Language::Scala,
        code: r#"case class User(
  id: Long,
  name: String,
  email: String,
  role: UserRole
)

object User {
  def apply(name: String, email: String): User =
    User(System.currentTimeMillis(), name, email, UserRole.Member)
}

sealed trait UserRole
object UserRole {
  case object Admin extends UserRole
  case object Member extends UserRole
}"#,
    },
    CodeTemplate {
        name: "Data Analysis",
        description: "An R script for data analysis using tidyverse",
        language: Language::R,
        code: r#"library(tidyverse)

data <- read_csv("data.csv")

processed_data <- data %>%
  filter(!is.na(value)) %>%
  group_by(category) %>%
  summarise(
    mean = mean(value),
    sd = sd(value),
    n = n()
  ) %>%
  arrange(desc(mean))

ggplot(processed_data, aes(x = category, y = mean)) +
  geom_bar(stat = "identity") +
  theme_minimal()"#,
    },
    CodeTemplate {
        name: "C Struct",
        description: "A C struct with functions",
        language: Language::C,
        code: r#"#include <stdio.h>
#include <stdlib.h>
#include <string.h>

typedef struct {
    char name[50];
    int age;
    float salary;
} Employee;

Employee* create_employee(const char* name, int age, float salary) {
    Employee* emp = (Employee*)malloc(sizeof(Employee));
    if (emp == NULL) {
        return NULL;
    }

    strncpy(emp->name, name, sizeof(emp->name) - 1);
    emp->name[sizeof(emp->name) - 1] = '\0';
    emp->age = age;
    emp->salary = salary;

    return emp;
}

void free_employee(Employee* emp) {
    free(emp);
}"#,
    },
];

pub fn for_language(language: Language) -> impl Iterator<Item = &'static CodeTemplate> {
    CODE_TEMPLATES
        .iter()
        .filter(move |template| template.language == language)
}

/// Case-insensitive lookup by template name, optionally restricted to one language.
pub fn find(name: &str, language: Option<Language>) -> Option<&'static CodeTemplate> {
    CODE_TEMPLATES.iter().find(|template| {
        template.name.eq_ignore_ascii_case(name.trim())
            && language.map_or(true, |language| template.language == language)
    })
}

#[cfg(test)]
mod tests {
    use super::{find, for_language, CODE_TEMPLATES};
    use crate::language::Language;

    #[test]
    fn every_language_has_a_template() {
        for language in Language::ALL {
            assert!(for_language(language).next().is_some(), "{language}");
        }
    }

    #[test]
    fn find_ignores_case() {
        let template = find("fastapi endpoint", None).unwrap();
        assert_eq!(template.language, Language::Python);
        assert!(find("FastAPI Endpoint", Some(Language::Go)).is_none());
        assert!(find("nothing like this", None).is_none());
    }

    #[test]
    fn names_are_unique() {
        for (i, template) in CODE_TEMPLATES.iter().enumerate() {
            assert!(CODE_TEMPLATES[i + 1..]
                .iter()
                .all(|other| other.name != template.name));
        }
    }
}
